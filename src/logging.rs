// ==========================================
// 日志初始化 (tracing / tracing-subscriber)
// ==========================================
// 职责: 进程启动时装配全局订阅器, 测试场景单独入口
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 装配全局日志订阅器, 仅在进程入口调用一次
///
/// 日志级别由 RUST_LOG 控制, 未设置时默认 info.
/// 例如: RUST_LOG=debug 或 RUST_LOG=order_tracking_engine=trace
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 测试用日志入口, 集成测试的构造辅助函数里调用
///
/// 固定 debug 级别并走 test_writer, 输出归属到当前测试用例.
/// 用 try_init 吞掉重复注册, 同一进程内多个测试先后调用是安全的.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
