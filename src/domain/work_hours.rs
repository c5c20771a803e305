// ==========================================
// 订单跟踪对账引擎 - 工时台账实体
// ==========================================
// 职责: 计划/实际工时记账 (与工序 1:1, 与订单 1:N)
// ==========================================

use serde::{Deserialize, Serialize};

/// 效率比值的上限 (计划/实际,防止极端值污染聚合)
pub const EFFICIENCY_CAP: f64 = 2.0;

/// 分阶段工时 (小时)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseHours {
    /// 准备工时
    pub setup: f64,
    /// 加工工时
    pub machining: f64,
    /// 精整工时
    pub finishing: f64,
    /// 合计工时
    pub total: f64,
}

impl PhaseHours {
    /// 由三个阶段构造,自动汇总 total
    pub fn new(setup: f64, machining: f64, finishing: f64) -> Self {
        Self {
            setup,
            machining,
            finishing,
            total: setup + machining + finishing,
        }
    }

    /// 全零工时 (新建台账的实际侧初值)
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// 工时台账记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkHoursRecord {
    /// 台账ID
    pub work_hours_id: String,
    /// 所属订单ID
    pub order_id: String,
    /// 关联工序ID
    pub process_id: String,
    /// 计划工时
    pub planned: PhaseHours,
    /// 实际工时
    pub actual: PhaseHours,
    /// 效率比值 (计划/实际, 上限 EFFICIENCY_CAP)
    pub efficiency: f64,
    /// 成本偏差 (元, 正值为超支)
    pub cost_variance: f64,
}

impl WorkHoursRecord {
    /// 重算效率比值
    ///
    /// 实际工时为 0 时效率记 0 (尚未开工,不是无限高效)。
    pub fn compute_efficiency(planned_total: f64, actual_total: f64) -> f64 {
        if actual_total <= 0.0 || planned_total <= 0.0 {
            0.0
        } else {
            (planned_total / actual_total).min(EFFICIENCY_CAP)
        }
    }

    /// 工时完成率 (实际/计划, 上限 100)
    ///
    /// 聚合进度用: 计划为 0 或实际为 0 都记 0,权重仍然保留。
    pub fn completion_ratio(&self) -> f64 {
        if self.planned.total <= 0.0 {
            return 0.0;
        }
        (self.actual.total / self.planned.total * 100.0).min(100.0)
    }

    /// 基础形状校验
    pub fn is_well_formed(&self) -> bool {
        self.planned.total >= 0.0
            && self.actual.total >= 0.0
            && self.planned.setup >= 0.0
            && self.planned.machining >= 0.0
            && self.planned.finishing >= 0.0
            && self.actual.setup >= 0.0
            && self.actual.machining >= 0.0
            && self.actual.finishing >= 0.0
            && !self.order_id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_hours_total() {
        let h = PhaseHours::new(2.0, 10.0, 3.0);
        assert_eq!(h.total, 15.0);
        assert_eq!(PhaseHours::zero().total, 0.0);
    }

    #[test]
    fn test_compute_efficiency() {
        // 计划 = 实际 -> 1.0
        assert_eq!(WorkHoursRecord::compute_efficiency(40.0, 40.0), 1.0);
        // 实际为 0 -> 0 (尚未开工)
        assert_eq!(WorkHoursRecord::compute_efficiency(40.0, 0.0), 0.0);
        // 极端高效被钳制
        assert_eq!(WorkHoursRecord::compute_efficiency(100.0, 10.0), EFFICIENCY_CAP);
    }

    #[test]
    fn test_completion_ratio() {
        let record = WorkHoursRecord {
            work_hours_id: "W001".to_string(),
            order_id: "Q100".to_string(),
            process_id: "P001".to_string(),
            planned: PhaseHours::new(2.0, 30.0, 8.0),
            actual: PhaseHours::new(2.0, 15.0, 3.0),
            efficiency: 1.0,
            cost_variance: 0.0,
        };
        assert_eq!(record.completion_ratio(), 50.0);

        // 实际超计划时钳制到 100
        let mut over = record.clone();
        over.actual = PhaseHours::new(4.0, 40.0, 16.0);
        assert_eq!(over.completion_ratio(), 100.0);

        // 计划为 0 -> 0
        let mut blank = record;
        blank.planned = PhaseHours::zero();
        assert_eq!(blank.completion_ratio(), 0.0);
    }
}
