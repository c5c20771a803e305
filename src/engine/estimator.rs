// ==========================================
// 订单跟踪对账引擎 - 复杂度估算引擎
// ==========================================
// 职责: 订单复杂度分级 + 基线工时估算
// 红线: 纯函数,同输入必同输出; 无 I/O, 无副作用;
//       估算永不失败: 缺失输入按 0 兜底,降级估算优于阻断建流程
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::ComplexityScore;
use crate::domain::work_hours::PhaseHours;

// ==========================================
// 评分参数
// ==========================================

/// 精密加工类标签关键词 (命中任意一个计 2 分)
pub const PRECISION_KEYWORDS: [&str; 5] = ["精密加工", "精密", "高精度", "镜面", "五轴"];

/// 数量分档阈值: >50 计 1 分, >100 计 2 分
const QUANTITY_TIER_1: u32 = 50;
const QUANTITY_TIER_2: u32 = 100;

/// 金额分档阈值: >50万 计 1 分, >100万 计 2 分
const AMOUNT_TIER_1: f64 = 500_000.0;
const AMOUNT_TIER_2: f64 = 1_000_000.0;

/// 基线单件工时表 (小时/件)
const BASE_SETUP_HOURS_PER_UNIT: f64 = 0.05;
const BASE_MACHINING_HOURS_PER_UNIT: f64 = 0.30;
const BASE_FINISHING_HOURS_PER_UNIT: f64 = 0.10;

/// 数量规模因子上限
const QUANTITY_SCALE_CAP: f64 = 2.0;

/// 单阶段工时下限 (小时)
const MIN_PHASE_HOURS: f64 = 1.0;

// ==========================================
// Estimator - 复杂度估算引擎
// ==========================================
pub struct Estimator {
    // 无状态引擎,不需要注入依赖
}

impl Estimator {
    pub fn new() -> Self {
        Self {}
    }

    /// 复杂度分级
    ///
    /// 三项独立打分求和:
    /// - 数量分档: >100 件 2 分, >50 件 1 分
    /// - 金额分档: >100 万 2 分, >50 万 1 分
    /// - 精密标签: 命中关键词集 2 分
    ///
    /// 总分 >=4 -> High, >=2 -> Medium, 否则 Low
    pub fn classify_complexity(&self, order: &Order) -> ComplexityScore {
        let score = self.quantity_points(order.quantity)
            + self.amount_points(order.estimated_amount)
            + self.precision_points(&order.tags);

        if score >= 4 {
            ComplexityScore::High
        } else if score >= 2 {
            ComplexityScore::Medium
        } else {
            ComplexityScore::Low
        }
    }

    /// 基线工时估算
    ///
    /// 单件工时表 × 复杂度乘数 × 数量规模因子 (上限 2.0),
    /// 逐阶段取整且不低于下限。金额/数量缺失按 0 兜底,不报错。
    pub fn estimate_effort(&self, order: &Order, complexity: ComplexityScore) -> PhaseHours {
        let quantity = order.quantity as f64;
        let scale = (1.0 + quantity / 100.0).min(QUANTITY_SCALE_CAP);
        let factor = complexity.multiplier() * scale;

        let setup = Self::round_with_floor(quantity * BASE_SETUP_HOURS_PER_UNIT * factor);
        let machining = Self::round_with_floor(quantity * BASE_MACHINING_HOURS_PER_UNIT * factor);
        let finishing = Self::round_with_floor(quantity * BASE_FINISHING_HOURS_PER_UNIT * factor);

        PhaseHours::new(setup, machining, finishing)
    }

    // ==========================================
    // 打分细则
    // ==========================================

    fn quantity_points(&self, quantity: u32) -> u32 {
        if quantity > QUANTITY_TIER_2 {
            2
        } else if quantity > QUANTITY_TIER_1 {
            1
        } else {
            0
        }
    }

    fn amount_points(&self, amount: f64) -> u32 {
        // 缺失金额上游映射为 0, 此处自然落入 0 分档
        if amount > AMOUNT_TIER_2 {
            2
        } else if amount > AMOUNT_TIER_1 {
            1
        } else {
            0
        }
    }

    fn precision_points(&self, tags: &[String]) -> u32 {
        let hit = tags
            .iter()
            .any(|tag| PRECISION_KEYWORDS.iter().any(|kw| tag.contains(kw)));
        if hit {
            2
        } else {
            0
        }
    }

    fn round_with_floor(hours: f64) -> f64 {
        hours.round().max(MIN_PHASE_HOURS)
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new()
    }
}
