// ==========================================
// 订单跟踪对账引擎 - 工作流阶段视图
// ==========================================
// 职责: 五阶段流水线的可视化派生对象
// 红线: 阶段数固定为 5, 名称顺序固定
// ==========================================

use crate::domain::types::StageStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 流水线阶段总数 (固定)
pub const STAGE_COUNT: usize = 5;

/// 固定顺序的阶段名称
pub const STAGE_NAMES: [&str; STAGE_COUNT] =
    ["订单计划", "数据准备", "加工处理", "精整", "完成交付"];

/// 各阶段对应的整体进度区间 [start, end)
///
/// 阶段进度 = clamp((整体进度 - start) * 100 / (end - start), 0, 100)。
/// 第二阶段从 0 起算: 数据准备与订单计划在进度轴上并行推进。
pub const STAGE_PROGRESS_BANDS: [(f64, f64); STAGE_COUNT] =
    [(0.0, 10.0), (0.0, 30.0), (30.0, 70.0), (70.0, 90.0), (90.0, 100.0)];

/// 工作流阶段 (派生视图)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStage {
    /// 阶段名称 (固定集合)
    pub name: String,
    /// 阶段状态
    pub status: StageStatus,
    /// 阶段进度 (0-100)
    pub progress: f64,
    /// 预计完成日期 (启发式估算,非硬承诺)
    pub estimated_completion: NaiveDate,
    /// 归属资源 (负责人/工序ID/工人ID)
    pub resources: Vec<String>,
}
