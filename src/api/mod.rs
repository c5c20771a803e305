// ==========================================
// 订单跟踪对账引擎 - API 层
// ==========================================
// 职责: 提供业务 API 门面,供进程入口与上层集成调用
// ==========================================

pub mod tracking_api;

pub use tracking_api::TrackingApi;
