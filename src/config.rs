// ==========================================
// 订单跟踪对账引擎 - 引擎配置
// ==========================================
// 职责: 对账周期、数据源超时等运行参数
// 说明: 开发环境用短周期,生产环境用长周期,
//       测试无需等待生产级间隔
// ==========================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 环境变量: 数据库路径覆盖
pub const ENV_DB_PATH: &str = "ORDER_TRACKER_DB_PATH";
/// 环境变量: 对账周期覆盖 (秒)
pub const ENV_RECONCILE_SECS: &str = "ORDER_TRACKER_RECONCILE_SECS";

/// 引擎运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 对账周期 (秒)
    pub reconcile_interval_secs: u64,
    /// 单个数据源拉取超时 (毫秒), 超时按不可达降级
    pub provider_timeout_ms: u64,
    /// 日报"近期活跃"滑动窗口 (天)
    pub recent_report_window_days: i64,
    /// 阶段预计完成日期的启发式步长 (天/阶段)
    pub stage_lead_days: i64,
}

impl EngineConfig {
    /// 生产环境预设 (5 分钟周期)
    pub fn production() -> Self {
        Self {
            reconcile_interval_secs: 300,
            provider_timeout_ms: 5_000,
            recent_report_window_days: 7,
            stage_lead_days: 7,
        }
    }

    /// 开发/测试环境预设 (短周期)
    pub fn development() -> Self {
        Self {
            reconcile_interval_secs: 2,
            provider_timeout_ms: 500,
            recent_report_window_days: 7,
            stage_lead_days: 7,
        }
    }

    /// 在预设之上应用环境变量覆盖
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = std::env::var(ENV_RECONCILE_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.reconcile_interval_secs = secs,
                _ => tracing::warn!("忽略非法的 {} 值: {}", ENV_RECONCILE_SECS, raw),
            }
        }
        self
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::production()
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录回退
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./order_tracking.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("order-tracking-engine-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("order-tracking-engine");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("order_tracking.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let dev = EngineConfig::development();
        let prod = EngineConfig::production();
        assert!(dev.reconcile_interval() < prod.reconcile_interval());
        assert_eq!(dev.recent_report_window_days, 7);
    }

    #[test]
    fn test_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
