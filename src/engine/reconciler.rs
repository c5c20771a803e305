// ==========================================
// 订单跟踪对账引擎 - 对账引擎 (核心)
// ==========================================
// 职责: 拉取四个数据源 -> 加权聚合进度 -> 健康判定 -> 组装快照
// 红线:
// - 订单主记录缺失是唯一致命错误 (没有订单的快照无意义)
// - 其余数据源故障一律降级吸收: 空列表 + 健康降级,不中断对账
// - 对账过程不回写数据源; 回写是独立的显式操作
// - 四路拉取并发执行,全部返回(或失败)后才组装快照,不发布半成品
// ==========================================

use crate::config::EngineConfig;
use crate::domain::daily_report::DailyReportRecord;
use crate::domain::order::Order;
use crate::domain::process::ProcessRecord;
use crate::domain::snapshot::OrderSnapshot;
use crate::domain::work_hours::WorkHoursRecord;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::health::{HealthChecker, ProviderReachability};
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::{DailyReportProvider, OrderProvider, ProcessProvider, WorkHoursProvider};
use chrono::{NaiveDate, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;

// ==========================================
// 聚合权重 (各数据源类别至多贡献一次)
// ==========================================
const PROCESS_WEIGHT: f64 = 0.4;
const WORK_HOURS_WEIGHT: f64 = 0.4;
const DAILY_REPORT_WEIGHT: f64 = 0.2;
/// 近期有日报活动时的固定进度贡献
const DAILY_REPORT_BONUS: f64 = 20.0;

/// 聚合进度的可解释分解
#[derive(Debug, Clone, Copy)]
pub struct ProgressAggregation {
    /// 加权进度累计
    pub weighted_total: f64,
    /// 权重累计 (恒 <= 1.0)
    pub weight: f64,
    /// 最终聚合进度 (0-100)
    pub aggregate: f64,
}

// ==========================================
// ReconcileEngine - 对账引擎
// ==========================================
pub struct ReconcileEngine {
    orders: Arc<dyn OrderProvider>,
    processes: Arc<dyn ProcessProvider>,
    work_hours: Arc<dyn WorkHoursProvider>,
    daily_reports: Arc<dyn DailyReportProvider>,
    health_checker: HealthChecker,
    config: EngineConfig,
}

impl ReconcileEngine {
    pub fn new(
        orders: Arc<dyn OrderProvider>,
        processes: Arc<dyn ProcessProvider>,
        work_hours: Arc<dyn WorkHoursProvider>,
        daily_reports: Arc<dyn DailyReportProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            orders,
            processes,
            work_hours,
            daily_reports,
            health_checker: HealthChecker::new(),
            config,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 对单个订单执行一次完整对账
    ///
    /// # 返回
    /// - Ok(OrderSnapshot): 对账快照 (可能处于降级健康状态)
    /// - Err(EngineError::OrderNotFound): 订单主记录缺失
    /// - Err(EngineError::Provider): 订单数据源本身不可达
    pub async fn reconcile(&self, order_id: &str) -> EngineResult<OrderSnapshot> {
        let today = Utc::now().date_naive();
        let report_since = today - chrono::Duration::days(self.config.recent_report_window_days);

        // 四路并发拉取;快照仅在全部返回(或失败)后组装
        let (order_result, (processes, process_ok), (work_hours, work_hours_ok), (reports, reports_ok)) = futures::join!(
            self.fetch_order(order_id),
            self.fetch_guarded("process", self.processes.list_for_order(order_id)),
            self.fetch_guarded("work_hours", self.work_hours.list_for_order(order_id)),
            self.fetch_guarded(
                "daily_report",
                self.daily_reports.list_for_order(order_id, Some(report_since)),
            ),
        );
        let order = order_result?;

        // 畸形记录按缺失处理,绝不让单条脏数据打断对账循环
        let processes = retain_well_formed(processes, "ProcessRecord", ProcessRecord::is_well_formed);
        let work_hours =
            retain_well_formed(work_hours, "WorkHoursRecord", WorkHoursRecord::is_well_formed);
        let reports =
            retain_well_formed(reports, "DailyReportRecord", DailyReportRecord::is_well_formed);

        let aggregation = Self::aggregate_progress(
            &order,
            &processes,
            &work_hours,
            &reports,
            today,
            self.config.recent_report_window_days,
        );

        let health = self.health_checker.evaluate(ProviderReachability {
            order: true, // 能走到这里说明订单源本周期可达
            process: process_ok,
            work_hours: work_hours_ok,
            daily_report: reports_ok,
        });

        if health.unreachable_count() > 0 {
            tracing::warn!(
                "对账降级完成: order_id={}, overall={}, unreachable={}",
                order_id,
                health.overall,
                health.unreachable_count()
            );
        }

        Ok(OrderSnapshot {
            order,
            processes,
            work_hours,
            daily_reports: reports,
            health,
            aggregate_progress: aggregation.aggregate,
            reconciled_at: Utc::now(),
        })
    }

    /// 将聚合进度回写到订单记录
    ///
    /// 独立的显式操作: 对账是读式流程,绝不在对账中隐式回写。
    pub async fn write_back_progress(&self, snapshot: &OrderSnapshot) -> EngineResult<()> {
        self.orders
            .update_status(
                &snapshot.order.order_id,
                snapshot.order.status,
                snapshot.aggregate_progress,
            )
            .await?;
        tracing::info!(
            "进度已回写: order_id={}, progress={:.1}",
            snapshot.order.order_id,
            snapshot.aggregate_progress
        );
        Ok(())
    }

    // ==========================================
    // 加权聚合 (纯函数)
    // ==========================================

    /// 加权进度聚合
    ///
    /// 每个数据源类别至多贡献一次 (权重合计恒 <= 1.0):
    /// - 工序: 进度均值 × 0.4
    /// - 工时: 完成率均值 × 0.4 (实际为 0 贡献 0 进度,权重照算)
    /// - 日报: 滑动窗口内有记录则固定 +20 × 0.2
    ///
    /// 权重为 0 (三类数据全缺) 时回退到订单自存进度。
    /// 这样即便工序/工时数据滞后,"是否有人在报工"也能体现在进度上。
    pub fn aggregate_progress(
        order: &Order,
        processes: &[ProcessRecord],
        work_hours: &[WorkHoursRecord],
        daily_reports: &[DailyReportRecord],
        today: NaiveDate,
        report_window_days: i64,
    ) -> ProgressAggregation {
        let mut weighted_total = 0.0;
        let mut weight = 0.0;

        if !processes.is_empty() {
            let mean: f64 =
                processes.iter().map(|p| p.progress).sum::<f64>() / processes.len() as f64;
            weighted_total += mean * PROCESS_WEIGHT;
            weight += PROCESS_WEIGHT;
        }

        if !work_hours.is_empty() {
            let mean: f64 = work_hours.iter().map(|w| w.completion_ratio()).sum::<f64>()
                / work_hours.len() as f64;
            weighted_total += mean * WORK_HOURS_WEIGHT;
            weight += WORK_HOURS_WEIGHT;
        }

        let has_recent_report = daily_reports
            .iter()
            .any(|r| r.is_recent(today, report_window_days));
        if has_recent_report {
            weighted_total += DAILY_REPORT_BONUS;
            weight += DAILY_REPORT_WEIGHT;
        }

        let aggregate = if weight > 0.0 {
            (weighted_total / weight).clamp(0.0, 100.0)
        } else {
            // 三类数据全缺: 订单自存进度原样使用
            order.progress.clamp(0.0, 100.0)
        };

        ProgressAggregation {
            weighted_total,
            weight,
            aggregate,
        }
    }

    // ==========================================
    // 数据源拉取 (带超时保护)
    // ==========================================

    /// 拉取订单主记录
    ///
    /// 订单源不可达/超时 -> 错误冒出 (没有订单无法组装快照);
    /// 查无记录/记录畸形 -> OrderNotFound。
    async fn fetch_order(&self, order_id: &str) -> EngineResult<Order> {
        let fetched = timeout(self.config.provider_timeout(), self.orders.get_order(order_id))
            .await
            .map_err(|_| {
                EngineError::Provider(ProviderError::Timeout {
                    provider: "order".to_string(),
                })
            })??;

        match fetched {
            Some(order) if order.is_well_formed() => Ok(order),
            Some(order) => {
                tracing::warn!("订单记录形状校验失败,按缺失处理: order_id={}", order.order_id);
                Err(EngineError::OrderNotFound {
                    order_id: order_id.to_string(),
                })
            }
            None => Err(EngineError::OrderNotFound {
                order_id: order_id.to_string(),
            }),
        }
    }

    /// 非订单数据源的降级拉取
    ///
    /// # 返回
    /// (记录列表, 本周期是否可达); 不可达/超时返回空列表 + false,
    /// 永不向上抛错。
    async fn fetch_guarded<T, F>(&self, provider: &str, fetch: F) -> (Vec<T>, bool)
    where
        F: Future<Output = ProviderResult<Vec<T>>>,
    {
        match timeout(self.config.provider_timeout(), fetch).await {
            Ok(Ok(records)) => (records, true),
            Ok(Err(e)) => {
                tracing::warn!("数据源拉取失败,本周期按空处理: provider={}, err={}", provider, e);
                (Vec::new(), !e.is_unreachable())
            }
            Err(_) => {
                tracing::warn!("数据源拉取超时,按不可达处理: provider={}", provider);
                (Vec::new(), false)
            }
        }
    }
}

/// 形状校验过滤: 畸形记录丢弃并记日志,不中断对账
fn retain_well_formed<T>(
    records: Vec<T>,
    entity: &str,
    check: impl Fn(&T) -> bool,
) -> Vec<T> {
    let before = records.len();
    let kept: Vec<T> = records.into_iter().filter(|r| check(r)).collect();
    if kept.len() < before {
        tracing::warn!(
            "丢弃形状校验失败的记录: entity={}, dropped={}",
            entity,
            before - kept.len()
        );
    }
    kept
}
