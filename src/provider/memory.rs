// ==========================================
// 订单跟踪对账引擎 - 内存数据源适配器
// ==========================================
// 职责: 测试与演示用的内存实现
// 能力: 可注入"数据源不可达"故障; 带拉取计数便于断言调度行为
// ==========================================

use crate::domain::daily_report::DailyReportRecord;
use crate::domain::order::Order;
use crate::domain::process::ProcessRecord;
use crate::domain::types::OrderStatus;
use crate::domain::work_hours::WorkHoursRecord;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::{DailyReportProvider, OrderProvider, ProcessProvider, WorkHoursProvider};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

/// 故障注入开关与拉取计数 (四个内存适配器共用的骨架)
#[derive(Default)]
struct FaultState {
    unavailable: AtomicBool,
    fetch_count: AtomicU64,
}

impl FaultState {
    /// 拉取前置检查: 计数 + 故障注入
    fn check(&self, provider: &str) -> ProviderResult<()> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable {
                provider: provider.to_string(),
                reason: "故障注入".to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// MemoryOrderProvider - 订单数据源 (内存)
// ==========================================
#[derive(Default)]
pub struct MemoryOrderProvider {
    orders: RwLock<HashMap<String, Order>>,
    fault: FaultState,
}

impl MemoryOrderProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一条订单
    pub fn insert(&self, order: Order) {
        if let Ok(mut orders) = self.orders.write() {
            orders.insert(order.order_id.clone(), order);
        }
    }

    /// 注入/解除"数据源不可达"故障
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fault.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 累计拉取次数 (含失败的)
    pub fn fetch_count(&self) -> u64 {
        self.fault.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderProvider for MemoryOrderProvider {
    async fn get_order(&self, order_id: &str) -> ProviderResult<Option<Order>> {
        self.fault.check("order")?;
        let orders = self
            .orders
            .read()
            .map_err(|e| ProviderError::LockError(e.to_string()))?;
        Ok(orders.get(order_id).cloned())
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        progress: f64,
    ) -> ProviderResult<()> {
        self.fault.check("order")?;
        let mut orders = self
            .orders
            .write()
            .map_err(|e| ProviderError::LockError(e.to_string()))?;
        match orders.get_mut(order_id) {
            Some(order) => {
                order.status = status;
                order.progress = progress.clamp(0.0, 100.0);
                Ok(())
            }
            None => Err(ProviderError::InternalError(format!(
                "订单不存在,无法更新状态: order_id={}",
                order_id
            ))),
        }
    }
}

// ==========================================
// MemoryProcessProvider - 工序数据源 (内存)
// ==========================================
#[derive(Default)]
pub struct MemoryProcessProvider {
    records: RwLock<Vec<ProcessRecord>>,
    fault: FaultState,
}

impl MemoryProcessProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: ProcessRecord) {
        if let Ok(mut records) = self.records.write() {
            records.push(record);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.fault.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> u64 {
        self.fault.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessProvider for MemoryProcessProvider {
    async fn list_for_order(&self, order_id: &str) -> ProviderResult<Vec<ProcessRecord>> {
        self.fault.check("process")?;
        let records = self
            .records
            .read()
            .map_err(|e| ProviderError::LockError(e.to_string()))?;
        Ok(records
            .iter()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn create(&self, record: ProcessRecord) -> ProviderResult<String> {
        self.fault.check("process")?;
        let process_id = record.process_id.clone();
        let mut records = self
            .records
            .write()
            .map_err(|e| ProviderError::LockError(e.to_string()))?;
        records.push(record);
        Ok(process_id)
    }
}

// ==========================================
// MemoryWorkHoursProvider - 工时数据源 (内存)
// ==========================================
#[derive(Default)]
pub struct MemoryWorkHoursProvider {
    records: RwLock<Vec<WorkHoursRecord>>,
    fault: FaultState,
}

impl MemoryWorkHoursProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: WorkHoursRecord) {
        if let Ok(mut records) = self.records.write() {
            records.push(record);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.fault.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> u64 {
        self.fault.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkHoursProvider for MemoryWorkHoursProvider {
    async fn list_for_order(&self, order_id: &str) -> ProviderResult<Vec<WorkHoursRecord>> {
        self.fault.check("work_hours")?;
        let records = self
            .records
            .read()
            .map_err(|e| ProviderError::LockError(e.to_string()))?;
        Ok(records
            .iter()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn create(&self, record: WorkHoursRecord) -> ProviderResult<String> {
        self.fault.check("work_hours")?;
        let work_hours_id = record.work_hours_id.clone();
        let mut records = self
            .records
            .write()
            .map_err(|e| ProviderError::LockError(e.to_string()))?;
        records.push(record);
        Ok(work_hours_id)
    }
}

// ==========================================
// MemoryDailyReportProvider - 日报数据源 (内存)
// ==========================================
#[derive(Default)]
pub struct MemoryDailyReportProvider {
    records: RwLock<Vec<DailyReportRecord>>,
    fault: FaultState,
}

impl MemoryDailyReportProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: DailyReportRecord) {
        if let Ok(mut records) = self.records.write() {
            records.push(record);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.fault.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> u64 {
        self.fault.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DailyReportProvider for MemoryDailyReportProvider {
    async fn list_for_order(
        &self,
        order_id: &str,
        since: Option<NaiveDate>,
    ) -> ProviderResult<Vec<DailyReportRecord>> {
        self.fault.check("daily_report")?;
        let records = self
            .records
            .read()
            .map_err(|e| ProviderError::LockError(e.to_string()))?;
        Ok(records
            .iter()
            .filter(|r| r.order_id == order_id)
            .filter(|r| since.map_or(true, |d| r.report_date >= d))
            .cloned()
            .collect())
    }
}
