// ==========================================
// 订单跟踪对账引擎 - 订单实体
// ==========================================
// 职责: 订单主记录 (由外部订单子系统拥有,引擎侧只读)
// 红线: 引擎不直接改写订单,回写仅通过显式 update_status 操作
// ==========================================

use crate::domain::types::{OrderStatus, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 订单主记录
///
/// 对账引擎视角下的不可变业务记录。progress 为订单子系统自存的
/// 进度百分比,仅在四个数据源都无关联记录时作为聚合进度的回退值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 订单ID
    pub order_id: String,
    /// 显示名称
    pub name: String,
    /// 客户名称
    pub client: String,
    /// 数量 (件)
    pub quantity: u32,
    /// 金额估算 (元)
    pub estimated_amount: f64,
    /// 订单标签 (如 "精密加工")
    pub tags: Vec<String>,
    /// 下单日期
    pub order_date: NaiveDate,
    /// 交付日期
    pub delivery_date: NaiveDate,
    /// 订单状态
    pub status: OrderStatus,
    /// 优先级
    pub priority: Priority,
    /// 订单自存进度 (0-100)
    pub progress: f64,
}

impl Order {
    /// 基础形状校验
    ///
    /// 进度超出 [0,100] 或交付日期早于下单日期的记录视为畸形数据,
    /// 对账时按缺失处理。
    pub fn is_well_formed(&self) -> bool {
        (0.0..=100.0).contains(&self.progress)
            && self.delivery_date >= self.order_date
            && !self.order_id.trim().is_empty()
    }

    /// 完成订单的历史加工周期 (天)
    ///
    /// 仅对 Completed 状态有意义,用于舰队指标的平均加工时长估算。
    pub fn processing_days(&self) -> Option<i64> {
        if self.status == OrderStatus::Completed {
            Some((self.delivery_date - self.order_date).num_days())
        } else {
            None
        }
    }
}
