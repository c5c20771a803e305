// ==========================================
// 订单跟踪对账引擎 - 跟踪注册表 (调度器)
// ==========================================
// 职责: 持有每个订单的最新快照; 驱动周期性重对账; 舰队指标聚合
// 红线:
// - 显式构造对象 + 显式生命周期 (new/shutdown), 不做全局单例,
//   测试中可多实例共存
// - 每个订单恰好一个轻量刷新任务,track 幂等不重复注册
// - 快照替换必须原子: 读者看到旧快照或新快照的整体,绝无混合
// - 单个订单的周期失败只保留旧快照 + 记调度告警,不波及其他订单
// - 停跟踪/停机后不再有周期触发; 在途对账结果直接丢弃,不报错
// ==========================================

use crate::config::EngineConfig;
use crate::domain::metrics::FleetMetrics;
use crate::domain::snapshot::OrderSnapshot;
use crate::domain::stage::WorkflowStage;
use crate::domain::types::HealthVerdict;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::reconciler::ReconcileEngine;
use crate::engine::stages::StageDeriver;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::task::JoinHandle;

// ==========================================
// TrackingRegistry - 跟踪注册表
// ==========================================
pub struct TrackingRegistry {
    reconciler: Arc<ReconcileEngine>,
    stage_deriver: StageDeriver,
    config: EngineConfig,
    /// 订单ID -> 最新快照 (整体替换,Arc 保证读者持有的引用完整)
    snapshots: Arc<RwLock<HashMap<String, Arc<OrderSnapshot>>>>,
    /// 订单ID -> 周期刷新任务句柄
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
    /// 订单ID -> 调度告警 (周期失败时写入,成功后清除)
    sched_alerts: Arc<RwLock<HashMap<String, String>>>,
}

impl TrackingRegistry {
    pub fn new(reconciler: Arc<ReconcileEngine>, config: EngineConfig) -> Self {
        let stage_deriver = StageDeriver::new(config.stage_lead_days);
        Self {
            reconciler,
            stage_deriver,
            config,
            snapshots: Arc::new(RwLock::new(HashMap::new())),
            timers: Mutex::new(HashMap::new()),
            sched_alerts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // ==========================================
    // 跟踪生命周期
    // ==========================================

    /// 开始跟踪订单 (幂等)
    ///
    /// 首次调用: 立即对账一次并注册周期刷新任务。
    /// 重复调用: 重新对账并替换快照,但绝不注册第二个定时器。
    pub async fn track(&self, order_id: &str) -> EngineResult<Arc<OrderSnapshot>> {
        let snapshot = Arc::new(self.reconciler.reconcile(order_id).await?);
        self.store_snapshot(order_id, snapshot.clone());
        self.ensure_timer(order_id);
        tracing::info!(
            "订单进入跟踪: order_id={}, progress={:.1}, health={}",
            order_id,
            snapshot.aggregate_progress,
            snapshot.health.overall
        );
        Ok(snapshot)
    }

    /// 停止跟踪订单 (显式解除注册)
    ///
    /// 返回后不再有该订单的周期对账触发; 在途周期被中止。
    pub fn untrack(&self, order_id: &str) {
        if let Ok(mut timers) = self.timers.lock() {
            if let Some(handle) = timers.remove(order_id) {
                handle.abort();
            }
        }
        if let Ok(mut snapshots) = self.snapshots.write() {
            snapshots.remove(order_id);
        }
        if let Ok(mut alerts) = self.sched_alerts.write() {
            alerts.remove(order_id);
        }
        tracing::info!("订单停止跟踪: order_id={}", order_id);
    }

    /// 立即重对账一次 (跟踪中的订单同时替换存量快照)
    ///
    /// 供写流程 (如工序物化) 之后主动刷新视图。
    pub async fn refresh_now(&self, order_id: &str) -> EngineResult<Arc<OrderSnapshot>> {
        let snapshot = Arc::new(self.reconciler.reconcile(order_id).await?);
        if self.is_tracking(order_id) {
            self.store_snapshot(order_id, snapshot.clone());
        }
        Ok(snapshot)
    }

    /// 停机: 中止全部刷新任务并清空注册表
    ///
    /// 返回后不再有任何周期对账触发。供进程干净退出与测试使用。
    pub fn shutdown(&self) {
        if let Ok(mut timers) = self.timers.lock() {
            for (_, handle) in timers.drain() {
                handle.abort();
            }
        }
        if let Ok(mut snapshots) = self.snapshots.write() {
            snapshots.clear();
        }
        if let Ok(mut alerts) = self.sched_alerts.write() {
            alerts.clear();
        }
        tracing::info!("注册表已停机,全部周期任务已取消");
    }

    // ==========================================
    // 读接口
    // ==========================================

    /// 读取订单最新快照 (未跟踪/未对账过 -> None, 不是错误)
    pub fn get_snapshot(&self, order_id: &str) -> Option<Arc<OrderSnapshot>> {
        match self.snapshots.read() {
            Ok(snapshots) => snapshots.get(order_id).cloned(),
            Err(e) => {
                tracing::error!("快照表读锁获取失败: {}", e);
                None
            }
        }
    }

    /// 读取订单五阶段视图
    ///
    /// 快照缺席时返回空列表, 调用方按"尚不可用"处理,不是错误。
    pub fn get_stages(&self, order_id: &str) -> Vec<WorkflowStage> {
        match self.get_snapshot(order_id) {
            Some(snapshot) => self
                .stage_deriver
                .derive(&snapshot, Utc::now().date_naive()),
            None => Vec::new(),
        }
    }

    /// 是否正在跟踪该订单
    pub fn is_tracking(&self, order_id: &str) -> bool {
        self.timers
            .lock()
            .map(|timers| timers.contains_key(order_id))
            .unwrap_or(false)
    }

    /// 在跟踪订单数
    pub fn tracked_count(&self) -> usize {
        self.timers.lock().map(|timers| timers.len()).unwrap_or(0)
    }

    // ==========================================
    // 舰队指标
    // ==========================================

    /// 跨全部在跟踪订单折叠出舰队指标
    pub fn metrics(&self) -> FleetMetrics {
        let snapshots: Vec<Arc<OrderSnapshot>> = match self.snapshots.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(e) => {
                tracing::error!("快照表读锁获取失败: {}", e);
                return FleetMetrics::empty();
            }
        };

        let tracked = snapshots.len();
        let active = snapshots
            .iter()
            .filter(|s| s.order.status.is_active())
            .count();

        let healthy = snapshots
            .iter()
            .filter(|s| s.health.overall == HealthVerdict::Healthy)
            .count();
        let healthy_ratio = if tracked > 0 {
            healthy as f64 / tracked as f64 * 100.0
        } else {
            0.0
        };

        // 平均加工周期: 由历史完成订单的下单->交付跨度估算
        let completed_days: Vec<i64> = snapshots
            .iter()
            .filter_map(|s| s.order.processing_days())
            .collect();
        let avg_processing_days = if completed_days.is_empty() {
            None
        } else {
            Some(completed_days.iter().sum::<i64>() as f64 / completed_days.len() as f64)
        };

        let mut critical_alerts: Vec<String> = snapshots
            .iter()
            .filter(|s| s.health.overall == HealthVerdict::Critical)
            .map(|s| {
                format!(
                    "数据源危急: order_id={}, 不可达数据源 {} 个",
                    s.order.order_id,
                    s.health.unreachable_count()
                )
            })
            .collect();
        if let Ok(alerts) = self.sched_alerts.read() {
            critical_alerts.extend(alerts.values().cloned());
        }
        critical_alerts.sort();

        FleetMetrics {
            tracked_orders: tracked,
            active_orders: active,
            healthy_ratio,
            avg_processing_days,
            critical_alerts,
            computed_at: Utc::now(),
        }
    }

    // ==========================================
    // 内部: 快照存储与定时器
    // ==========================================

    /// 原子替换快照 (整体插入,读者拿到的 Arc 不受影响)
    fn store_snapshot(&self, order_id: &str, snapshot: Arc<OrderSnapshot>) {
        match self.snapshots.write() {
            Ok(mut snapshots) => {
                snapshots.insert(order_id.to_string(), snapshot);
            }
            Err(e) => {
                tracing::error!("快照表写锁获取失败: {}", e);
            }
        }
    }

    /// 确保该订单恰好有一个周期刷新任务
    fn ensure_timer(&self, order_id: &str) {
        let mut timers = match self.timers.lock() {
            Ok(timers) => timers,
            Err(e) => {
                tracing::error!("定时器表锁获取失败: {}", e);
                let alert = EngineError::Scheduling(format!("定时器注册失败: {}", e));
                self.record_sched_alert(order_id, alert.to_string());
                return;
            }
        };
        if timers.contains_key(order_id) {
            return;
        }

        let reconciler = self.reconciler.clone();
        let snapshots = self.snapshots.clone();
        let alerts = self.sched_alerts.clone();
        let period = self.config.reconcile_interval();
        let order_key = order_id.to_string();

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                match reconciler.reconcile(&order_key).await {
                    Ok(snapshot) => {
                        if let Ok(mut map) = snapshots.write() {
                            map.insert(order_key.clone(), Arc::new(snapshot));
                        }
                        if let Ok(mut map) = alerts.write() {
                            map.remove(&order_key);
                        }
                    }
                    Err(e) => {
                        // 保留上一份快照; 失败只影响本订单
                        tracing::warn!(
                            "周期对账失败,保留旧快照: order_id={}, err={}",
                            order_key,
                            e
                        );
                        let alert = EngineError::Scheduling(format!(
                            "周期对账失败: order_id={}, {}",
                            order_key, e
                        ));
                        if let Ok(mut map) = alerts.write() {
                            map.insert(order_key.clone(), alert.to_string());
                        }
                    }
                }
            }
        });
        timers.insert(order_id.to_string(), handle);
    }

    fn record_sched_alert(&self, order_id: &str, message: String) {
        if let Ok(mut alerts) = self.sched_alerts.write() {
            alerts.insert(order_id.to_string(), message);
        }
    }
}

impl Drop for TrackingRegistry {
    fn drop(&mut self) {
        // 实例销毁时中止遗留任务,避免后台任务比注册表活得更久
        if let Ok(mut timers) = self.timers.lock() {
            for (_, handle) in timers.drain() {
                handle.abort();
            }
        }
    }
}
