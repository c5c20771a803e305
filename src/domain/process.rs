// ==========================================
// 订单跟踪对账引擎 - 工序实体
// ==========================================
// 职责: 制造工序记录 (1 个订单对应 N 条工序)
// 红线: complexity 在物化时刻定格,对账周期内不重算
// ==========================================

use crate::domain::types::ComplexityScore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 制造工序记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// 工序ID
    pub process_id: String,
    /// 所属订单ID
    pub order_id: String,
    /// 工序名称
    pub name: String,
    /// 工序状态 (子系统自由文本,引擎不解释)
    pub status: String,
    /// 工序自身进度 (0-100)
    pub progress: f64,
    /// 负责人
    pub assignee: Option<String>,
    /// 设备利用率 (0-100)
    pub machine_utilization: f64,
    /// 计划工时 (小时)
    pub planned_hours: f64,
    /// 实际工时 (小时)
    pub actual_hours: f64,
    /// 复杂度评分 (物化时定格)
    pub complexity: ComplexityScore,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl ProcessRecord {
    /// 基础形状校验
    pub fn is_well_formed(&self) -> bool {
        (0.0..=100.0).contains(&self.progress)
            && (0.0..=100.0).contains(&self.machine_utilization)
            && self.planned_hours >= 0.0
            && self.actual_hours >= 0.0
            && !self.order_id.trim().is_empty()
    }
}
