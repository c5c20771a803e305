// ==========================================
// 订单跟踪对账引擎 - 主入口
// ==========================================
// 技术栈: Tokio + Rust + SQLite
// 系统定位: 跨子系统一致性视图
// ==========================================

use std::sync::{Arc, Mutex};

use order_tracking_engine::api::TrackingApi;
use order_tracking_engine::config::{get_default_db_path, EngineConfig};
use order_tracking_engine::engine::materializer::ProcessMaterializer;
use order_tracking_engine::engine::reconciler::ReconcileEngine;
use order_tracking_engine::provider::{
    SqliteDailyReportProvider, SqliteOrderProvider, SqliteProcessProvider,
    SqliteWorkHoursProvider,
};
use order_tracking_engine::service::TrackingRegistry;
use order_tracking_engine::{db, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", order_tracking_engine::APP_NAME);
    tracing::info!("系统版本: {}", order_tracking_engine::VERSION);
    tracing::info!("==================================================");

    // 配置: 生产默认值 + 环境变量覆盖
    let config = EngineConfig::production().with_env_overrides();
    tracing::info!(
        "对账周期: {}s, 数据源超时: {}ms",
        config.reconcile_interval_secs,
        config.provider_timeout_ms
    );

    // 数据库路径 (环境变量可覆盖)
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    // 数据源适配器 (共享同一连接)
    let orders = Arc::new(SqliteOrderProvider::new(conn.clone()));
    let processes = Arc::new(SqliteProcessProvider::new(conn.clone()));
    let work_hours = Arc::new(SqliteWorkHoursProvider::new(conn.clone()));
    let daily_reports = Arc::new(SqliteDailyReportProvider::new(conn));

    // 引擎与服务装配
    let reconciler = Arc::new(ReconcileEngine::new(
        orders.clone(),
        processes.clone(),
        work_hours.clone(),
        daily_reports,
        config.clone(),
    ));
    let registry = Arc::new(TrackingRegistry::new(reconciler, config));
    let materializer = Arc::new(ProcessMaterializer::new(orders, processes, work_hours));
    let api = TrackingApi::new(registry, materializer);

    tracing::info!("引擎装配完成,等待退出信号 (Ctrl+C)");

    tokio::signal::ctrl_c().await?;

    tracing::info!("收到退出信号,开始停机");
    api.shutdown();
    tracing::info!("停机完成");
    Ok(())
}
