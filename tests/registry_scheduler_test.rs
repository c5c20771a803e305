// ==========================================
// TrackingRegistry 调度测试
// ==========================================
// 场景: 周期触发、track 幂等、untrack/shutdown 后静默、
//       周期失败保留旧快照
// 说明: start_paused 虚拟时钟,测试不真实等待

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use order_tracking_engine::config::EngineConfig;
use order_tracking_engine::domain::types::{HealthVerdict, OrderStatus, Priority};
use order_tracking_engine::domain::Order;
use order_tracking_engine::engine::ReconcileEngine;
use order_tracking_engine::provider::{
    MemoryDailyReportProvider, MemoryOrderProvider, MemoryProcessProvider,
    MemoryWorkHoursProvider,
};
use order_tracking_engine::service::TrackingRegistry;

struct TestRig {
    orders: Arc<MemoryOrderProvider>,
    registry: TrackingRegistry,
    period: Duration,
}

fn make_rig() -> TestRig {
    order_tracking_engine::logging::init_test();
    let config = EngineConfig::development();
    let period = config.reconcile_interval();
    let orders = Arc::new(MemoryOrderProvider::new());
    let reconciler = Arc::new(ReconcileEngine::new(
        orders.clone(),
        Arc::new(MemoryProcessProvider::new()),
        Arc::new(MemoryWorkHoursProvider::new()),
        Arc::new(MemoryDailyReportProvider::new()),
        config.clone(),
    ));
    let registry = TrackingRegistry::new(reconciler, config);
    TestRig {
        orders,
        registry,
        period,
    }
}

fn sample_order(order_id: &str, status: OrderStatus) -> Order {
    Order {
        order_id: order_id.to_string(),
        name: "法兰盘".to_string(),
        client: "北方重工".to_string(),
        quantity: 20,
        estimated_amount: 200_000.0,
        tags: vec![],
        order_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        delivery_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        status,
        priority: Priority::Medium,
        progress: 30.0,
    }
}

#[tokio::test(start_paused = true)]
async fn test_track_registers_periodic_reconcile() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1", OrderStatus::Processing));

    rig.registry.track("Q1").await.unwrap();
    assert_eq!(rig.orders.fetch_count(), 1);
    assert!(rig.registry.is_tracking("Q1"));
    assert!(rig.registry.get_snapshot("Q1").is_some());

    // 两个完整周期 -> 两次周期对账
    tokio::time::sleep(rig.period * 2 + Duration::from_millis(100)).await;
    assert_eq!(rig.orders.fetch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_track_is_idempotent_no_duplicate_timer() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1", OrderStatus::Processing));

    rig.registry.track("Q1").await.unwrap();
    rig.registry.track("Q1").await.unwrap();
    assert_eq!(rig.registry.tracked_count(), 1);
    // 两次 track 各立即对账一次
    assert_eq!(rig.orders.fetch_count(), 2);

    // 单定时器: 一个周期只多一次拉取
    tokio::time::sleep(rig.period + Duration::from_millis(100)).await;
    assert_eq!(rig.orders.fetch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_untrack_silences_order() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1", OrderStatus::Processing));

    rig.registry.track("Q1").await.unwrap();
    rig.registry.untrack("Q1");

    assert!(!rig.registry.is_tracking("Q1"));
    assert!(rig.registry.get_snapshot("Q1").is_none());
    assert!(rig.registry.get_stages("Q1").is_empty());

    let before = rig.orders.fetch_count();
    tokio::time::sleep(rig.period * 3).await;
    // untrack 返回后不再有任何周期触发
    assert_eq!(rig.orders.fetch_count(), before);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_all_timers() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1", OrderStatus::Processing));
    rig.orders.insert(sample_order("Q2", OrderStatus::Planning));

    rig.registry.track("Q1").await.unwrap();
    rig.registry.track("Q2").await.unwrap();
    assert_eq!(rig.registry.tracked_count(), 2);

    rig.registry.shutdown();
    assert_eq!(rig.registry.tracked_count(), 0);
    assert_eq!(rig.registry.metrics().tracked_orders, 0);

    let before = rig.orders.fetch_count();
    tokio::time::sleep(rig.period * 3).await;
    assert_eq!(rig.orders.fetch_count(), before);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_keeps_old_snapshot_and_alerts() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1", OrderStatus::Processing));

    let first = rig.registry.track("Q1").await.unwrap();
    assert_eq!(first.health.overall, HealthVerdict::Healthy);

    // 订单数据源故障 -> 周期失败,旧快照保留
    rig.orders.set_unavailable(true);
    tokio::time::sleep(rig.period + Duration::from_millis(100)).await;

    let kept = rig.registry.get_snapshot("Q1").unwrap();
    assert_eq!(kept.reconciled_at, first.reconciled_at);

    let metrics = rig.registry.metrics();
    // 调度告警走统一的错误分类,消息带"调度异常"前缀
    assert!(metrics
        .critical_alerts
        .iter()
        .any(|a| a.starts_with("调度异常") && a.contains("周期对账失败") && a.contains("Q1")));

    // 故障恢复 -> 下一周期成功并清除调度告警
    rig.orders.set_unavailable(false);
    tokio::time::sleep(rig.period + Duration::from_millis(100)).await;
    assert!(rig.registry.metrics().critical_alerts.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_fleet_metrics_fold() {
    let rig = make_rig();
    rig.orders.insert(sample_order("Q1", OrderStatus::Processing));
    rig.orders.insert(sample_order("Q2", OrderStatus::Completed));
    rig.orders.insert(sample_order("Q3", OrderStatus::Planning));

    rig.registry.track("Q1").await.unwrap();
    rig.registry.track("Q2").await.unwrap();
    rig.registry.track("Q3").await.unwrap();

    let metrics = rig.registry.metrics();
    assert_eq!(metrics.tracked_orders, 3);
    // Completed 不算活跃
    assert_eq!(metrics.active_orders, 2);
    assert!((metrics.healthy_ratio - 100.0).abs() < 1e-9);
    // 仅 Q2 完成: 2026-01-10 -> 2026-03-10 = 60 天
    assert_eq!(metrics.avg_processing_days, Some(60.0));
    assert!(metrics.critical_alerts.is_empty());
    assert!(metrics.computed_at <= Utc::now());
}
