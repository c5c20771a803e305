// ==========================================
// 订单跟踪对账引擎 - 数据源适配层
// ==========================================
// 职责: 四个外部子系统的窄读写契约
// 红线: 适配器不含聚合/评分逻辑;
//       "查无记录"返回空列表,不抛错; 不可达才抛 Unavailable
// ==========================================

pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::{ProviderError, ProviderResult};
pub use memory::{
    MemoryDailyReportProvider, MemoryOrderProvider, MemoryProcessProvider,
    MemoryWorkHoursProvider,
};
pub use sqlite::{
    SqliteDailyReportProvider, SqliteOrderProvider, SqliteProcessProvider,
    SqliteWorkHoursProvider,
};

use crate::domain::daily_report::DailyReportRecord;
use crate::domain::order::Order;
use crate::domain::process::ProcessRecord;
use crate::domain::types::OrderStatus;
use crate::domain::work_hours::WorkHoursRecord;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// OrderProvider Trait
// ==========================================
// 用途: 订单子系统适配接口
// 实现者: SqliteOrderProvider, MemoryOrderProvider
#[async_trait]
pub trait OrderProvider: Send + Sync {
    /// 按ID读取订单
    ///
    /// # 返回
    /// - Ok(Some(Order)): 找到订单
    /// - Ok(None): 查无此订单 (不是错误)
    /// - Err(ProviderError): 数据源不可达等
    async fn get_order(&self, order_id: &str) -> ProviderResult<Option<Order>>;

    /// 更新订单状态与进度 (写协作方, 仅由订单创建流程显式调用)
    ///
    /// 对账周期内绝不隐式调用此方法。
    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        progress: f64,
    ) -> ProviderResult<()>;
}

// ==========================================
// ProcessProvider Trait
// ==========================================
#[async_trait]
pub trait ProcessProvider: Send + Sync {
    /// 列出订单关联的全部工序 (空列表为合法结果)
    async fn list_for_order(&self, order_id: &str) -> ProviderResult<Vec<ProcessRecord>>;

    /// 创建工序记录 (写协作方)
    ///
    /// # 返回
    /// - Ok(String): 新建工序ID
    async fn create(&self, record: ProcessRecord) -> ProviderResult<String>;
}

// ==========================================
// WorkHoursProvider Trait
// ==========================================
#[async_trait]
pub trait WorkHoursProvider: Send + Sync {
    /// 列出订单关联的全部工时台账 (空列表为合法结果)
    async fn list_for_order(&self, order_id: &str) -> ProviderResult<Vec<WorkHoursRecord>>;

    /// 创建工时台账 (写协作方)
    ///
    /// # 返回
    /// - Ok(String): 新建台账ID
    async fn create(&self, record: WorkHoursRecord) -> ProviderResult<String>;
}

// ==========================================
// DailyReportProvider Trait
// ==========================================
#[async_trait]
pub trait DailyReportProvider: Send + Sync {
    /// 列出订单关联的日报 (空列表为合法结果)
    ///
    /// # 参数
    /// - since: 可选起始日期 (含), None 表示全量
    async fn list_for_order(
        &self,
        order_id: &str,
        since: Option<NaiveDate>,
    ) -> ProviderResult<Vec<DailyReportRecord>>;
}
