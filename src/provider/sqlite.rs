// ==========================================
// 订单跟踪对账引擎 - SQLite 数据源适配器
// ==========================================
// 职责: 四个子系统 trait 的内置 SQLite 实现
// 红线: 只做行映射与增查,不含对账/评分逻辑
// ==========================================
// 说明: 四个适配器共享一条连接 (Arc<Mutex>), 查询短小,
//       在异步上下文中直接同步执行。
// ==========================================

use crate::domain::daily_report::DailyReportRecord;
use crate::domain::order::Order;
use crate::domain::process::ProcessRecord;
use crate::domain::types::{ComplexityScore, OrderStatus, Priority};
use crate::domain::work_hours::{PhaseHours, WorkHoursRecord};
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::{DailyReportProvider, OrderProvider, ProcessProvider, WorkHoursProvider};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// 加锁辅助: 锁中毒按数据源故障处理
fn lock_conn<'a>(
    conn: &'a Arc<Mutex<Connection>>,
) -> ProviderResult<MutexGuard<'a, Connection>> {
    conn.lock()
        .map_err(|e| ProviderError::LockError(e.to_string()))
}

// ==========================================
// SqliteOrderProvider - 订单数据源
// ==========================================
pub struct SqliteOrderProvider {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteOrderProvider {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Order> {
        let tags_json: String = row.get("tags")?;
        let status: String = row.get("status")?;
        let priority: String = row.get("priority")?;
        Ok(Order {
            order_id: row.get("order_id")?,
            name: row.get("name")?,
            client: row.get("client")?,
            quantity: row.get::<_, i64>("quantity")?.max(0) as u32,
            estimated_amount: row.get("estimated_amount")?,
            // 标签列损坏时按无标签处理,不让单行拖垮整个查询
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            order_date: row.get::<_, NaiveDate>("order_date")?,
            delivery_date: row.get::<_, NaiveDate>("delivery_date")?,
            status: OrderStatus::from_str(&status),
            priority: Priority::from_str(&priority),
            progress: row.get("progress")?,
        })
    }
}

#[async_trait]
impl OrderProvider for SqliteOrderProvider {
    async fn get_order(&self, order_id: &str) -> ProviderResult<Option<Order>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT order_id, name, client, quantity, estimated_amount, tags, \
                    order_date, delivery_date, status, priority, progress \
             FROM orders WHERE order_id = ?1",
        )?;
        let mut rows = stmt.query_map(params![order_id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        progress: f64,
    ) -> ProviderResult<()> {
        let conn = lock_conn(&self.conn)?;
        let updated = conn.execute(
            "UPDATE orders SET status = ?2, progress = ?3 WHERE order_id = ?1",
            params![order_id, status.to_db_str(), progress.clamp(0.0, 100.0)],
        )?;
        if updated == 0 {
            return Err(ProviderError::InternalError(format!(
                "订单不存在,无法更新状态: order_id={}",
                order_id
            )));
        }
        Ok(())
    }
}

// ==========================================
// SqliteProcessProvider - 工序数据源
// ==========================================
pub struct SqliteProcessProvider {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProcessProvider {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ProcessRecord> {
        let complexity: String = row.get("complexity")?;
        Ok(ProcessRecord {
            process_id: row.get("process_id")?,
            order_id: row.get("order_id")?,
            name: row.get("name")?,
            status: row.get("status")?,
            progress: row.get("progress")?,
            assignee: row.get("assignee")?,
            machine_utilization: row.get("machine_utilization")?,
            planned_hours: row.get("planned_hours")?,
            actual_hours: row.get("actual_hours")?,
            complexity: ComplexityScore::from_str(&complexity),
            created_at: row.get::<_, DateTime<Utc>>("created_at")?,
        })
    }
}

#[async_trait]
impl ProcessProvider for SqliteProcessProvider {
    async fn list_for_order(&self, order_id: &str) -> ProviderResult<Vec<ProcessRecord>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT process_id, order_id, name, status, progress, assignee, \
                    machine_utilization, planned_hours, actual_hours, complexity, created_at \
             FROM process_records WHERE order_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![order_id], Self::map_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    async fn create(&self, record: ProcessRecord) -> ProviderResult<String> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO process_records \
             (process_id, order_id, name, status, progress, assignee, \
              machine_utilization, planned_hours, actual_hours, complexity, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.process_id,
                record.order_id,
                record.name,
                record.status,
                record.progress,
                record.assignee,
                record.machine_utilization,
                record.planned_hours,
                record.actual_hours,
                record.complexity.to_db_str(),
                record.created_at,
            ],
        )?;
        Ok(record.process_id)
    }
}

// ==========================================
// SqliteWorkHoursProvider - 工时数据源
// ==========================================
pub struct SqliteWorkHoursProvider {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWorkHoursProvider {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<WorkHoursRecord> {
        Ok(WorkHoursRecord {
            work_hours_id: row.get("work_hours_id")?,
            order_id: row.get("order_id")?,
            process_id: row.get("process_id")?,
            planned: PhaseHours {
                setup: row.get("planned_setup")?,
                machining: row.get("planned_machining")?,
                finishing: row.get("planned_finishing")?,
                total: row.get("planned_total")?,
            },
            actual: PhaseHours {
                setup: row.get("actual_setup")?,
                machining: row.get("actual_machining")?,
                finishing: row.get("actual_finishing")?,
                total: row.get("actual_total")?,
            },
            efficiency: row.get("efficiency")?,
            cost_variance: row.get("cost_variance")?,
        })
    }
}

#[async_trait]
impl WorkHoursProvider for SqliteWorkHoursProvider {
    async fn list_for_order(&self, order_id: &str) -> ProviderResult<Vec<WorkHoursRecord>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT work_hours_id, order_id, process_id, \
                    planned_setup, planned_machining, planned_finishing, planned_total, \
                    actual_setup, actual_machining, actual_finishing, actual_total, \
                    efficiency, cost_variance \
             FROM work_hours_records WHERE order_id = ?1",
        )?;
        let rows = stmt.query_map(params![order_id], Self::map_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    async fn create(&self, record: WorkHoursRecord) -> ProviderResult<String> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO work_hours_records \
             (work_hours_id, order_id, process_id, \
              planned_setup, planned_machining, planned_finishing, planned_total, \
              actual_setup, actual_machining, actual_finishing, actual_total, \
              efficiency, cost_variance) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                record.work_hours_id,
                record.order_id,
                record.process_id,
                record.planned.setup,
                record.planned.machining,
                record.planned.finishing,
                record.planned.total,
                record.actual.setup,
                record.actual.machining,
                record.actual.finishing,
                record.actual.total,
                record.efficiency,
                record.cost_variance,
            ],
        )?;
        Ok(record.work_hours_id)
    }
}

// ==========================================
// SqliteDailyReportProvider - 日报数据源
// ==========================================
pub struct SqliteDailyReportProvider {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDailyReportProvider {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<DailyReportRecord> {
        let issues_json: String = row.get("issues")?;
        Ok(DailyReportRecord {
            report_id: row.get("report_id")?,
            order_id: row.get("order_id")?,
            worker_id: row.get("worker_id")?,
            report_date: row.get::<_, NaiveDate>("report_date")?,
            total_minutes: row.get::<_, i64>("total_minutes")?.max(0) as u32,
            productivity_score: row.get("productivity_score")?,
            issues: serde_json::from_str(&issues_json).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl DailyReportProvider for SqliteDailyReportProvider {
    async fn list_for_order(
        &self,
        order_id: &str,
        since: Option<NaiveDate>,
    ) -> ProviderResult<Vec<DailyReportRecord>> {
        let conn = lock_conn(&self.conn)?;
        let mut records = Vec::new();
        match since {
            Some(since_date) => {
                let mut stmt = conn.prepare(
                    "SELECT report_id, order_id, worker_id, report_date, \
                            total_minutes, productivity_score, issues \
                     FROM daily_report_records \
                     WHERE order_id = ?1 AND report_date >= ?2 \
                     ORDER BY report_date",
                )?;
                let rows = stmt.query_map(params![order_id, since_date], Self::map_row)?;
                for row in rows {
                    records.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT report_id, order_id, worker_id, report_date, \
                            total_minutes, productivity_score, issues \
                     FROM daily_report_records \
                     WHERE order_id = ?1 ORDER BY report_date",
                )?;
                let rows = stmt.query_map(params![order_id], Self::map_row)?;
                for row in rows {
                    records.push(row?);
                }
            }
        }
        Ok(records)
    }
}
