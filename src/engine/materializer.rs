// ==========================================
// 订单跟踪对账引擎 - 工序物化引擎
// ==========================================
// 职责: 订单创建流程的一次性落地: 估算工时、生成工序 +
//       配套工时台账、推进订单状态
// 红线: 这是唯一会写数据源的引擎; 复杂度评分在此定格,
//       写在工序记录上,之后不再重算
// ==========================================

use crate::domain::order::Order;
use crate::domain::process::ProcessRecord;
use crate::domain::types::{ComplexityScore, OrderStatus};
use crate::domain::work_hours::{PhaseHours, WorkHoursRecord};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::estimator::Estimator;
use crate::provider::{OrderProvider, ProcessProvider, WorkHoursProvider};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// ProcessMaterializer - 工序物化引擎
// ==========================================
pub struct ProcessMaterializer {
    orders: Arc<dyn OrderProvider>,
    processes: Arc<dyn ProcessProvider>,
    work_hours: Arc<dyn WorkHoursProvider>,
    estimator: Estimator,
}

impl ProcessMaterializer {
    pub fn new(
        orders: Arc<dyn OrderProvider>,
        processes: Arc<dyn ProcessProvider>,
        work_hours: Arc<dyn WorkHoursProvider>,
    ) -> Self {
        Self {
            orders,
            processes,
            work_hours,
            estimator: Estimator::new(),
        }
    }

    /// 一次性物化增强工序
    ///
    /// 流程:
    /// 1. 读取订单 (缺失 -> OrderNotFound)
    /// 2. 复杂度分级 + 基线工时估算
    /// 3. 创建工序记录 (复杂度定格其上)
    /// 4. 创建配套工时台账 (计划 = 估算, 实际 = 0)
    /// 5. 订单处于计划阶段时推进到数据准备
    ///
    /// # 返回
    /// - Ok(String): 新建工序ID
    pub async fn create_enhanced_process(&self, order_id: &str) -> EngineResult<String> {
        let order = self
            .orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| EngineError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        let complexity = self.estimator.classify_complexity(&order);
        let effort = self.estimator.estimate_effort(&order, complexity);

        let process = Self::build_process(&order, complexity, &effort);
        let process_id = self.processes.create(process).await?;

        let ledger = Self::build_work_hours(&order, &process_id, &effort);
        self.work_hours.create(ledger).await?;

        // 仅从计划阶段向前推进,不回退已推进的订单
        if order.status == OrderStatus::Planning {
            self.orders
                .update_status(order_id, OrderStatus::DataWork, order.progress)
                .await?;
        }

        tracing::info!(
            "工序物化完成: order_id={}, process_id={}, complexity={}, planned_total={:.0}h",
            order_id,
            process_id,
            complexity,
            effort.total
        );
        Ok(process_id)
    }

    fn build_process(
        order: &Order,
        complexity: ComplexityScore,
        effort: &PhaseHours,
    ) -> ProcessRecord {
        ProcessRecord {
            process_id: Uuid::new_v4().to_string(),
            order_id: order.order_id.clone(),
            name: format!("{} - 主工序", order.name),
            status: "PENDING".to_string(),
            progress: 0.0,
            assignee: None,
            machine_utilization: 0.0,
            planned_hours: effort.total,
            actual_hours: 0.0,
            complexity,
            created_at: Utc::now(),
        }
    }

    fn build_work_hours(order: &Order, process_id: &str, effort: &PhaseHours) -> WorkHoursRecord {
        WorkHoursRecord {
            work_hours_id: Uuid::new_v4().to_string(),
            order_id: order.order_id.clone(),
            process_id: process_id.to_string(),
            planned: *effort,
            actual: PhaseHours::zero(),
            efficiency: WorkHoursRecord::compute_efficiency(effort.total, 0.0),
            cost_variance: 0.0,
        }
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ComplexityScore, Priority};
    use crate::provider::memory::{
        MemoryOrderProvider, MemoryProcessProvider, MemoryWorkHoursProvider,
    };
    use chrono::NaiveDate;

    fn create_test_order(order_id: &str, status: OrderStatus) -> Order {
        Order {
            order_id: order_id.to_string(),
            name: "精密法兰".to_string(),
            client: "东方精工".to_string(),
            quantity: 120,
            estimated_amount: 1_200_000.0,
            tags: vec!["精密加工".to_string()],
            order_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            delivery_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            status,
            priority: Priority::High,
            progress: 0.0,
        }
    }

    #[tokio::test]
    async fn test_materialize_creates_process_and_ledger() {
        let orders = Arc::new(MemoryOrderProvider::new());
        let processes = Arc::new(MemoryProcessProvider::new());
        let work_hours = Arc::new(MemoryWorkHoursProvider::new());
        orders.insert(create_test_order("Q1", OrderStatus::Planning));

        let engine = ProcessMaterializer::new(
            orders.clone(),
            processes.clone(),
            work_hours.clone(),
        );
        let process_id = engine.create_enhanced_process("Q1").await.unwrap();

        // 工序: 复杂度为 High 且定格
        let created = processes.list_for_order("Q1").await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].process_id, process_id);
        assert_eq!(created[0].complexity, ComplexityScore::High);

        // 工时台账: 计划 = 估算, 实际 = 0
        let ledgers = work_hours.list_for_order("Q1").await.unwrap();
        assert_eq!(ledgers.len(), 1);
        assert_eq!(ledgers[0].process_id, process_id);
        assert!(ledgers[0].planned.total > 0.0);
        assert_eq!(ledgers[0].actual.total, 0.0);

        // 订单从计划推进到数据准备
        let order = orders.get_order("Q1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::DataWork);
    }

    #[tokio::test]
    async fn test_materialize_does_not_regress_status() {
        let orders = Arc::new(MemoryOrderProvider::new());
        let processes = Arc::new(MemoryProcessProvider::new());
        let work_hours = Arc::new(MemoryWorkHoursProvider::new());
        orders.insert(create_test_order("Q2", OrderStatus::Processing));

        let engine =
            ProcessMaterializer::new(orders.clone(), processes, work_hours);
        engine.create_enhanced_process("Q2").await.unwrap();

        let order = orders.get_order("Q2").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_materialize_missing_order() {
        let engine = ProcessMaterializer::new(
            Arc::new(MemoryOrderProvider::new()),
            Arc::new(MemoryProcessProvider::new()),
            Arc::new(MemoryWorkHoursProvider::new()),
        );
        let err = engine.create_enhanced_process("Q404").await.unwrap_err();
        assert!(matches!(err, EngineError::OrderNotFound { .. }));
    }
}
