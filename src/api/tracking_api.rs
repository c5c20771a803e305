// ==========================================
// 订单跟踪对账引擎 - 跟踪 API
// ==========================================
// 职责: 对外统一门面; 入参校验; 委托注册表与工序物化引擎
// 红线: 门面不做业务计算: 聚合、派生、调度全部在引擎层
// 架构: API 层 → 服务层 (TrackingRegistry) → 引擎层
// ==========================================

use std::sync::Arc;

use crate::domain::metrics::FleetMetrics;
use crate::domain::snapshot::OrderSnapshot;
use crate::domain::stage::WorkflowStage;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::materializer::ProcessMaterializer;
use crate::service::registry::TrackingRegistry;

// ==========================================
// TrackingApi - 跟踪 API
// ==========================================

/// 跟踪API
///
/// 职责：
/// 1. 订单跟踪生命周期（track / untrack / shutdown）
/// 2. 快照与五阶段视图查询
/// 3. 舰队指标查询
/// 4. 工序物化（估算 → 建工序 → 建工时 → 推进状态 → 立即重对账）
pub struct TrackingApi {
    registry: Arc<TrackingRegistry>,
    materializer: Arc<ProcessMaterializer>,
}

impl TrackingApi {
    /// 创建新的TrackingApi实例
    pub fn new(registry: Arc<TrackingRegistry>, materializer: Arc<ProcessMaterializer>) -> Self {
        Self {
            registry,
            materializer,
        }
    }

    /// 开始跟踪订单 (幂等), 返回首轮对账快照
    pub async fn track(&self, order_id: &str) -> EngineResult<Arc<OrderSnapshot>> {
        let order_id = Self::require_order_id(order_id)?;
        self.registry.track(order_id).await
    }

    /// 停止跟踪订单
    pub fn untrack(&self, order_id: &str) -> EngineResult<()> {
        let order_id = Self::require_order_id(order_id)?;
        self.registry.untrack(order_id);
        Ok(())
    }

    /// 查询订单最新快照 (未跟踪 -> None)
    pub fn get_snapshot(&self, order_id: &str) -> Option<Arc<OrderSnapshot>> {
        self.registry.get_snapshot(order_id)
    }

    /// 查询订单五阶段视图 (快照缺席 -> 空列表)
    pub fn get_stages(&self, order_id: &str) -> Vec<WorkflowStage> {
        self.registry.get_stages(order_id)
    }

    /// 查询舰队指标
    pub fn get_fleet_metrics(&self) -> FleetMetrics {
        self.registry.metrics()
    }

    /// 工序物化: 为订单创建带估算的增强工序
    ///
    /// 成功后立即重对账一次,使写入在本轮快照中可见。
    /// 重对账失败不回滚已写入的工序,只留给下一个周期覆盖。
    pub async fn create_enhanced_process(&self, order_id: &str) -> EngineResult<bool> {
        let order_id = Self::require_order_id(order_id)?;
        let process_id = self.materializer.create_enhanced_process(order_id).await?;
        tracing::info!(
            "增强工序已创建: order_id={}, process_id={}",
            order_id,
            process_id
        );
        if let Err(e) = self.registry.refresh_now(order_id).await {
            tracing::warn!(
                "工序创建后的立即重对账失败,等待下一周期: order_id={}, err={}",
                order_id,
                e
            );
        }
        Ok(true)
    }

    /// 停机: 取消全部周期任务
    pub fn shutdown(&self) {
        self.registry.shutdown();
    }

    fn require_order_id(order_id: &str) -> EngineResult<&str> {
        let trimmed = order_id.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidInput("订单ID不能为空".to_string()));
        }
        Ok(trimmed)
    }
}
