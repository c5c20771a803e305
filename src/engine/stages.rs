// ==========================================
// 订单跟踪对账引擎 - 工作流阶段推导引擎
// ==========================================
// 职责: 把对账快照映射到固定五阶段流水线视图
// 红线: 恒返回 5 个阶段,名称顺序固定; 纯函数,重复调用幂等
// ==========================================

use crate::domain::snapshot::OrderSnapshot;
use crate::domain::stage::{WorkflowStage, STAGE_COUNT, STAGE_NAMES, STAGE_PROGRESS_BANDS};
use crate::domain::types::{OrderStatus, StageStatus};
use chrono::NaiveDate;

// ==========================================
// StageDeriver - 阶段推导引擎
// ==========================================
pub struct StageDeriver {
    /// 预计完成日期的启发式步长 (天/阶段)
    stage_lead_days: i64,
}

impl StageDeriver {
    pub fn new(stage_lead_days: i64) -> Self {
        Self { stage_lead_days }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 由快照推导五阶段视图
    ///
    /// # 参数
    /// - snapshot: 对账快照
    /// - today: 预计完成日期的基准日
    ///
    /// # 返回
    /// 恒为 5 个阶段,按固定名称顺序排列
    pub fn derive(&self, snapshot: &OrderSnapshot, today: NaiveDate) -> Vec<WorkflowStage> {
        let overall = snapshot.aggregate_progress;
        let active_idx = self.active_stage_index(snapshot.order.status, overall);
        let delayed = snapshot.order.status == OrderStatus::Delayed;
        let completed_order = snapshot.order.status == OrderStatus::Completed;

        (0..STAGE_COUNT)
            .map(|idx| {
                let status = if completed_order {
                    StageStatus::Completed
                } else if idx < active_idx {
                    StageStatus::Completed
                } else if idx == active_idx {
                    // 延期订单的当前阶段标记为受阻
                    if delayed {
                        StageStatus::Blocked
                    } else {
                        StageStatus::Active
                    }
                } else {
                    StageStatus::Pending
                };

                WorkflowStage {
                    name: STAGE_NAMES[idx].to_string(),
                    status,
                    progress: Self::stage_progress(idx, overall),
                    estimated_completion: self.estimate_completion(today, active_idx, idx, status),
                    resources: Self::stage_resources(idx, snapshot),
                }
            })
            .collect()
    }

    // ==========================================
    // 推导细则
    // ==========================================

    /// 当前活跃阶段序号
    ///
    /// 状态在流水线上时直接取状态序号; Delayed 不在流水线上,
    /// 按整体进度落到对应进度区间的阶段。
    fn active_stage_index(&self, status: OrderStatus, overall: f64) -> usize {
        if let Some(idx) = status.pipeline_index() {
            return idx;
        }
        // 从后往前找第一个 start <= overall 的区间
        STAGE_PROGRESS_BANDS
            .iter()
            .rposition(|(start, _)| overall >= *start && *start > 0.0)
            .unwrap_or(0)
    }

    /// 阶段进度: 整体进度在该阶段区间上的线性映射, 钳制 [0,100]
    fn stage_progress(idx: usize, overall: f64) -> f64 {
        let (start, end) = STAGE_PROGRESS_BANDS[idx];
        if end <= start {
            return 0.0;
        }
        ((overall - start) * 100.0 / (end - start)).clamp(0.0, 100.0)
    }

    /// 预计完成日期: 基准日 + 步长 × 距活跃阶段的剩余级数 (启发式,非硬承诺)
    fn estimate_completion(
        &self,
        today: NaiveDate,
        active_idx: usize,
        idx: usize,
        status: StageStatus,
    ) -> NaiveDate {
        if status == StageStatus::Completed {
            return today;
        }
        let stages_ahead = (idx as i64 - active_idx as i64).max(0) + 1;
        today + chrono::Duration::days(self.stage_lead_days * stages_ahead)
    }

    /// 阶段归属资源
    ///
    /// - 数据准备: 日报活跃工人
    /// - 加工处理/精整: 工序ID + 负责人
    /// - 其余阶段: 客户归属
    fn stage_resources(idx: usize, snapshot: &OrderSnapshot) -> Vec<String> {
        let mut resources: Vec<String> = match idx {
            1 => snapshot
                .daily_reports
                .iter()
                .map(|r| r.worker_id.clone())
                .collect(),
            2 | 3 => snapshot
                .processes
                .iter()
                .flat_map(|p| {
                    let mut names = vec![p.process_id.clone()];
                    if let Some(assignee) = &p.assignee {
                        names.push(assignee.clone());
                    }
                    names
                })
                .collect(),
            _ => vec![snapshot.order.client.clone()],
        };
        resources.sort();
        resources.dedup();
        resources
    }
}

impl Default for StageDeriver {
    fn default() -> Self {
        Self::new(7)
    }
}
