// ==========================================
// 服务层模块声明
// ==========================================

pub mod registry;

pub use registry::TrackingRegistry;
