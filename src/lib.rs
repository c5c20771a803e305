// ==========================================
// 订单跟踪对账引擎 - 核心库
// ==========================================
// 技术栈: Tokio + Rust + SQLite
// 系统定位: 跨子系统一致性视图 (只读聚合为主,写入点受控)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据源适配层 - 四类数据源的统一访问
pub mod provider;

// 引擎层 - 业务规则 (估算/对账/健康/阶段派生/工序物化)
pub mod engine;

// 服务层 - 跟踪注册表与周期调度
pub mod service;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ComplexityScore, HealthVerdict, OrderStatus, Priority, StageStatus};

// 领域实体
pub use domain::{
    DailyReportRecord, FleetMetrics, Order, OrderSnapshot, PhaseHours, ProcessRecord,
    SystemHealth, WorkHoursRecord, WorkflowStage,
};

// 引擎
pub use engine::{
    EngineError, EngineResult, Estimator, HealthChecker, ProcessMaterializer, ReconcileEngine,
    StageDeriver,
};

// 服务与 API
pub use api::TrackingApi;
pub use service::TrackingRegistry;

// 配置
pub use config::EngineConfig;

// ==========================================
// 全局常量
// ==========================================

/// 系统版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用名称
pub const APP_NAME: &str = "订单跟踪对账引擎";
