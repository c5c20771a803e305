// ==========================================
// 订单跟踪对账引擎 - 日报实体
// ==========================================
// 职责: 工人每日活动记录 (1 个订单每天 N 条)
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日报记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReportRecord {
    /// 日报ID
    pub report_id: String,
    /// 所属订单ID
    pub order_id: String,
    /// 工人ID
    pub worker_id: String,
    /// 报告日期
    pub report_date: NaiveDate,
    /// 工作总分钟数
    pub total_minutes: u32,
    /// 派生生产力评分 (0-100)
    pub productivity_score: f64,
    /// 标记的问题列表
    pub issues: Vec<String>,
}

impl DailyReportRecord {
    /// 是否落在 today 之前的 window_days 天滑动窗口内 (含当天)
    pub fn is_recent(&self, today: NaiveDate, window_days: i64) -> bool {
        let age = (today - self.report_date).num_days();
        (0..=window_days).contains(&age)
    }

    /// 基础形状校验
    pub fn is_well_formed(&self) -> bool {
        // 一天 24 小时 = 1440 分钟
        self.total_minutes <= 1440
            && (0.0..=100.0).contains(&self.productivity_score)
            && !self.order_id.trim().is_empty()
            && !self.worker_id.trim().is_empty()
    }
}
