// ==========================================
// ReconcileEngine 集成测试
// ==========================================
// 场景: 四路并发拉取、数据源降级、脏数据过滤、加权聚合

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use order_tracking_engine::config::EngineConfig;
use order_tracking_engine::domain::types::{ComplexityScore, HealthVerdict, OrderStatus, Priority};
use order_tracking_engine::domain::work_hours::PhaseHours;
use order_tracking_engine::domain::{DailyReportRecord, Order, ProcessRecord, WorkHoursRecord};
use order_tracking_engine::engine::{EngineError, ReconcileEngine};
use order_tracking_engine::provider::{
    MemoryDailyReportProvider, MemoryOrderProvider, MemoryProcessProvider,
    MemoryWorkHoursProvider, OrderProvider,
};

struct TestRig {
    orders: Arc<MemoryOrderProvider>,
    processes: Arc<MemoryProcessProvider>,
    work_hours: Arc<MemoryWorkHoursProvider>,
    daily_reports: Arc<MemoryDailyReportProvider>,
    engine: ReconcileEngine,
}

fn make_rig() -> TestRig {
    order_tracking_engine::logging::init_test();
    let orders = Arc::new(MemoryOrderProvider::new());
    let processes = Arc::new(MemoryProcessProvider::new());
    let work_hours = Arc::new(MemoryWorkHoursProvider::new());
    let daily_reports = Arc::new(MemoryDailyReportProvider::new());
    let engine = ReconcileEngine::new(
        orders.clone(),
        processes.clone(),
        work_hours.clone(),
        daily_reports.clone(),
        EngineConfig::development(),
    );
    TestRig {
        orders,
        processes,
        work_hours,
        daily_reports,
        engine,
    }
}

fn sample_order(order_id: &str) -> Order {
    Order {
        order_id: order_id.to_string(),
        name: "精密轴承座".to_string(),
        client: "华东机械".to_string(),
        quantity: 60,
        estimated_amount: 600_000.0,
        tags: vec!["批产".to_string()],
        order_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        delivery_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        status: OrderStatus::Processing,
        priority: Priority::Medium,
        progress: 42.0,
    }
}

fn sample_process(process_id: &str, order_id: &str, progress: f64) -> ProcessRecord {
    ProcessRecord {
        process_id: process_id.to_string(),
        order_id: order_id.to_string(),
        name: "车削".to_string(),
        status: "IN_PROGRESS".to_string(),
        progress,
        assignee: Some("张工".to_string()),
        machine_utilization: 70.0,
        planned_hours: 40.0,
        actual_hours: 20.0,
        complexity: ComplexityScore::Medium,
        created_at: Utc::now(),
    }
}

fn sample_work_hours(work_hours_id: &str, order_id: &str, planned: f64, actual: f64) -> WorkHoursRecord {
    WorkHoursRecord {
        work_hours_id: work_hours_id.to_string(),
        order_id: order_id.to_string(),
        process_id: "P1".to_string(),
        planned: PhaseHours::new(planned * 0.2, planned * 0.6, planned * 0.2),
        actual: PhaseHours::new(actual * 0.2, actual * 0.6, actual * 0.2),
        efficiency: 1.0,
        cost_variance: 0.0,
    }
}

fn sample_report(report_id: &str, order_id: &str, report_date: NaiveDate) -> DailyReportRecord {
    DailyReportRecord {
        report_id: report_id.to_string(),
        order_id: order_id.to_string(),
        worker_id: "W-07".to_string(),
        report_date,
        total_minutes: 480,
        productivity_score: 85.0,
        issues: vec![],
    }
}

#[tokio::test]
async fn test_full_reconcile_all_sources_present() {
    let rig = make_rig();
    let today = Utc::now().date_naive();
    rig.orders.insert(sample_order("Q1"));
    rig.processes.insert(sample_process("P1", "Q1", 100.0));
    rig.processes.insert(sample_process("P2", "Q1", 100.0));
    rig.work_hours.insert(sample_work_hours("W1", "Q1", 40.0, 40.0));
    rig.daily_reports.insert(sample_report("R1", "Q1", today));

    let snapshot = rig.engine.reconcile("Q1").await.unwrap();

    assert_eq!(snapshot.health.overall, HealthVerdict::Healthy);
    assert_eq!(snapshot.processes.len(), 2);
    assert_eq!(snapshot.work_hours.len(), 1);
    assert_eq!(snapshot.daily_reports.len(), 1);
    // 工序均值 100×0.4 + 工时完成率 100×0.4 + 日报 20,
    // 权重 1.0 -> (40+40+20)/1.0 = 100
    assert!((snapshot.aggregate_progress - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_single_source_down_degrades_to_warning() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1"));
    rig.processes.insert(sample_process("P1", "Q1", 50.0));
    rig.work_hours.set_unavailable(true);

    let snapshot = rig.engine.reconcile("Q1").await.unwrap();

    // 降级完成: 不可达数据源在快照中呈现为空列表 + 健康警告
    assert_eq!(snapshot.health.overall, HealthVerdict::Warning);
    assert!(!snapshot.health.work_hours_reachable);
    assert!(snapshot.work_hours.is_empty());
    assert_eq!(snapshot.processes.len(), 1);
    // 仅工序贡献: 50×0.4 / 0.4 = 50
    assert!((snapshot.aggregate_progress - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_two_sources_down_is_critical() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1"));
    rig.work_hours.set_unavailable(true);
    rig.daily_reports.set_unavailable(true);

    let snapshot = rig.engine.reconcile("Q1").await.unwrap();

    assert_eq!(snapshot.health.overall, HealthVerdict::Critical);
    assert_eq!(snapshot.health.unreachable_count(), 2);
}

#[tokio::test]
async fn test_order_source_down_is_fatal_for_cycle() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1"));
    rig.orders.set_unavailable(true);

    let err = rig.engine.reconcile("Q1").await.unwrap_err();
    match err {
        EngineError::Provider(e) => assert!(e.is_unreachable()),
        other => panic!("期望 Provider 错误, 实际: {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let rig = make_rig();

    let err = rig.engine.reconcile("Q404").await.unwrap_err();
    assert!(matches!(err, EngineError::OrderNotFound { .. }));
}

#[tokio::test]
async fn test_stale_daily_report_gets_no_bonus() {
    let rig = make_rig();
    let today = Utc::now().date_naive();
    rig.orders.insert(sample_order("Q1"));
    // 超出 7 天滑动窗口的日报
    rig.daily_reports
        .insert(sample_report("R1", "Q1", today - chrono::Duration::days(30)));

    let snapshot = rig.engine.reconcile("Q1").await.unwrap();

    // 三类数据全缺 (旧日报被窗口过滤) -> 回退订单自存进度
    assert!(snapshot.daily_reports.is_empty());
    assert!((snapshot.aggregate_progress - 42.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_malformed_records_are_dropped_not_fatal() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1"));
    rig.processes.insert(sample_process("P1", "Q1", 60.0));
    // 进度越界的脏记录
    rig.processes.insert(sample_process("P2", "Q1", 150.0));

    let snapshot = rig.engine.reconcile("Q1").await.unwrap();

    assert_eq!(snapshot.processes.len(), 1);
    assert_eq!(snapshot.processes[0].process_id, "P1");
    // 聚合只基于合法记录: 60×0.4 / 0.4 = 60
    assert!((snapshot.aggregate_progress - 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_zero_actual_work_hours_contribute_zero_with_weight() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1"));
    rig.processes.insert(sample_process("P1", "Q1", 100.0));
    // 刚建档的台账: 计划有值,实际为 0
    rig.work_hours.insert(sample_work_hours("W1", "Q1", 40.0, 0.0));

    let snapshot = rig.engine.reconcile("Q1").await.unwrap();

    // (100×0.4 + 0×0.4) / 0.8 = 50, 空台账压低聚合而不是被忽略
    assert!((snapshot.aggregate_progress - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_write_back_is_explicit_not_implicit() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1"));
    rig.processes.insert(sample_process("P1", "Q1", 80.0));

    let snapshot = rig.engine.reconcile("Q1").await.unwrap();

    // 对账本身不回写
    let stored = rig.orders.get_order("Q1").await.unwrap().unwrap();
    assert!((stored.progress - 42.0).abs() < 1e-9);

    // 显式回写后订单进度更新
    rig.engine.write_back_progress(&snapshot).await.unwrap();
    let stored = rig.orders.get_order("Q1").await.unwrap().unwrap();
    assert!((stored.progress - 80.0).abs() < 1e-9);
}
