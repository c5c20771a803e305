// ==========================================
// 订单跟踪对账引擎 - 舰队指标
// ==========================================
// 职责: 跨全部在跟踪订单的驾驶舱聚合数字
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 舰队指标 (跨订单聚合)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetMetrics {
    /// 在跟踪订单总数
    pub tracked_orders: usize,
    /// 活跃订单数 (状态不在 {COMPLETED, DELAYED})
    pub active_orders: usize,
    /// 健康快照占比 (0-100)
    pub healthy_ratio: f64,
    /// 平均加工周期 (天, 由历史完成订单估算; 无样本时为 None)
    pub avg_processing_days: Option<f64>,
    /// 危急告警列表 (人类可读)
    pub critical_alerts: Vec<String>,
    /// 指标生成时间
    pub computed_at: DateTime<Utc>,
}

impl FleetMetrics {
    /// 空注册表的指标
    pub fn empty() -> Self {
        Self {
            tracked_orders: 0,
            active_orders: 0,
            healthy_ratio: 0.0,
            avg_processing_days: None,
            critical_alerts: Vec::new(),
            computed_at: Utc::now(),
        }
    }
}
