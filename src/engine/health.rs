// ==========================================
// 订单跟踪对账引擎 - 健康检查引擎
// ==========================================
// 职责: 由本周期四个数据源的拉取结果给出整体健康判定
// 红线: 检查必须廉价且永不失败: 数据源降级时给降级判定,
//       而不是让整个对账失败
// ==========================================

use crate::domain::snapshot::SystemHealth;
use crate::domain::types::HealthVerdict;
use chrono::Utc;

/// 本周期四个数据源的可达性 (由对账器的拉取结果填写)
///
/// "查无记录"不影响可达性; 只有 Unavailable/超时才算不可达。
#[derive(Debug, Clone, Copy)]
pub struct ProviderReachability {
    pub order: bool,
    pub process: bool,
    pub work_hours: bool,
    pub daily_report: bool,
}

impl ProviderReachability {
    pub fn all_reachable() -> Self {
        Self {
            order: true,
            process: true,
            work_hours: true,
            daily_report: true,
        }
    }
}

// ==========================================
// HealthChecker - 健康检查引擎
// ==========================================
pub struct HealthChecker {
    // 无状态引擎,不需要注入依赖
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成健康判定
    ///
    /// 规则 (可解释):
    /// - CRITICAL: >=2 个数据源不可达
    /// - WARNING: 恰好 1 个数据源不可达
    /// - HEALTHY: 全部可达
    pub fn evaluate(&self, reachability: ProviderReachability) -> SystemHealth {
        let unreachable = [
            reachability.order,
            reachability.process,
            reachability.work_hours,
            reachability.daily_report,
        ]
        .iter()
        .filter(|ok| !**ok)
        .count();

        let overall = match unreachable {
            0 => HealthVerdict::Healthy,
            1 => HealthVerdict::Warning,
            _ => HealthVerdict::Critical,
        };

        SystemHealth {
            overall,
            order_reachable: reachability.order,
            process_reachable: reachability.process,
            work_hours_reachable: reachability.work_hours,
            daily_report_reachable: reachability.daily_report,
            checked_at: Utc::now(),
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
