// ==========================================
// 订单跟踪对账引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型与派生视图
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod daily_report;
pub mod metrics;
pub mod order;
pub mod process;
pub mod snapshot;
pub mod stage;
pub mod types;
pub mod work_hours;

// 重导出核心类型
pub use daily_report::DailyReportRecord;
pub use metrics::FleetMetrics;
pub use order::Order;
pub use process::ProcessRecord;
pub use snapshot::{OrderSnapshot, SystemHealth};
pub use stage::{WorkflowStage, STAGE_COUNT, STAGE_NAMES, STAGE_PROGRESS_BANDS};
pub use types::{ComplexityScore, HealthVerdict, OrderStatus, Priority, StageStatus};
pub use work_hours::{PhaseHours, WorkHoursRecord, EFFICIENCY_CAP};
