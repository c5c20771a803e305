// ==========================================
// 订单跟踪对账引擎 - 对账快照
// ==========================================
// 职责: 单个订单跨四个数据源的一致性派生视图
// 红线: 快照整体替换,不做就地局部修改;
//       aggregate_progress 只能由快照内含列表 + 订单自存进度推导
// ==========================================

use crate::domain::daily_report::DailyReportRecord;
use crate::domain::order::Order;
use crate::domain::process::ProcessRecord;
use crate::domain::types::HealthVerdict;
use crate::domain::work_hours::WorkHoursRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// SystemHealth - 数据源健康判定
// ==========================================

/// 单次对账周期内四个数据源的可达性判定
///
/// 每个对账周期重新计算,不独立于快照持久化。
/// "可达"指本周期的拉取未因数据源故障/超时失败;
/// 查无记录仍然算可达。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SystemHealth {
    /// 整体判定
    pub overall: HealthVerdict,
    /// 订单数据源可达
    pub order_reachable: bool,
    /// 工序数据源可达
    pub process_reachable: bool,
    /// 工时数据源可达
    pub work_hours_reachable: bool,
    /// 日报数据源可达
    pub daily_report_reachable: bool,
    /// 检查时间
    pub checked_at: DateTime<Utc>,
}

impl SystemHealth {
    /// 不可达数据源个数
    pub fn unreachable_count(&self) -> usize {
        [
            self.order_reachable,
            self.process_reachable,
            self.work_hours_reachable,
            self.daily_report_reachable,
        ]
        .iter()
        .filter(|reachable| !**reachable)
        .count()
    }
}

// ==========================================
// OrderSnapshot - 对账快照
// ==========================================

/// 订单对账快照
///
/// 调用方视角下的只读值对象: 每个对账周期整体重建并原子替换,
/// 读者要么看到旧快照要么看到新快照,不会看到混合状态。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// 订单主记录
    pub order: Order,
    /// 关联工序列表
    pub processes: Vec<ProcessRecord>,
    /// 关联工时台账列表
    pub work_hours: Vec<WorkHoursRecord>,
    /// 关联日报列表
    pub daily_reports: Vec<DailyReportRecord>,
    /// 数据源健康判定
    pub health: SystemHealth,
    /// 聚合进度 (0-100, 仅由快照内含数据推导)
    pub aggregate_progress: f64,
    /// 本次对账时间
    pub reconciled_at: DateTime<Utc>,
}

impl OrderSnapshot {
    /// 快照是否处于降级状态 (本周期存在不可达数据源)
    pub fn is_degraded(&self) -> bool {
        self.health.overall != HealthVerdict::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_count() {
        let health = SystemHealth {
            overall: HealthVerdict::Warning,
            order_reachable: true,
            process_reachable: true,
            work_hours_reachable: false,
            daily_report_reachable: true,
            checked_at: Utc::now(),
        };
        assert_eq!(health.unreachable_count(), 1);
    }
}
