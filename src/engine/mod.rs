// ==========================================
// 订单跟踪对账引擎 - 引擎层
// ==========================================
// 职责: 实现对账/估算/健康/阶段推导的业务规则
// 红线: 纯计算引擎 (Estimator/HealthChecker/StageDeriver) 与
//       I/O 引擎 (ReconcileEngine/ProcessMaterializer) 分离,
//       互不共享可变状态
// ==========================================

pub mod error;
pub mod estimator;
pub mod health;
pub mod materializer;
pub mod reconciler;
pub mod stages;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use estimator::Estimator;
pub use health::{HealthChecker, ProviderReachability};
pub use materializer::ProcessMaterializer;
pub use reconciler::{ProgressAggregation, ReconcileEngine};
pub use stages::StageDeriver;
