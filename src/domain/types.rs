// ==========================================
// 订单跟踪对账引擎 - 领域类型定义
// ==========================================
// 职责: 定义跨模块共享的枚举类型
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 五阶段流水线 + 延期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Planning,   // 订单计划
    DataWork,   // 数据准备
    Processing, // 加工处理
    Finishing,  // 精整
    Completed,  // 完成交付
    Delayed,    // 延期
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl OrderStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PLANNING" => OrderStatus::Planning,
            "DATA_WORK" => OrderStatus::DataWork,
            "PROCESSING" => OrderStatus::Processing,
            "FINISHING" => OrderStatus::Finishing,
            "COMPLETED" => OrderStatus::Completed,
            "DELAYED" => OrderStatus::Delayed,
            _ => OrderStatus::Planning, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Planning => "PLANNING",
            OrderStatus::DataWork => "DATA_WORK",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Finishing => "FINISHING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Delayed => "DELAYED",
        }
    }

    /// 流水线阶段序号 (Planning=0 ... Completed=4)
    ///
    /// Delayed 不在流水线上,返回 None,由阶段推导器按进度归位。
    pub fn pipeline_index(&self) -> Option<usize> {
        match self {
            OrderStatus::Planning => Some(0),
            OrderStatus::DataWork => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::Finishing => Some(3),
            OrderStatus::Completed => Some(4),
            OrderStatus::Delayed => None,
        }
    }

    /// 是否为活跃订单 (未完成且未延期)
    pub fn is_active(&self) -> bool {
        !matches!(self, OrderStatus::Completed | OrderStatus::Delayed)
    }
}

// ==========================================
// 订单优先级 (Priority)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Priority {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "HIGH" => Priority::High,
            "MEDIUM" => Priority::Medium,
            _ => Priority::Low,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

// ==========================================
// 复杂度评分 (Complexity Score)
// ==========================================
// 红线: 工序物化时计算一次,之后不再重算 (反映创建时点的条件)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexityScore {
    Low,
    Medium,
    High,
}

impl fmt::Display for ComplexityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ComplexityScore {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "HIGH" => ComplexityScore::High,
            "MEDIUM" => ComplexityScore::Medium,
            _ => ComplexityScore::Low,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ComplexityScore::Low => "LOW",
            ComplexityScore::Medium => "MEDIUM",
            ComplexityScore::High => "HIGH",
        }
    }

    /// 工时估算的复杂度乘数
    pub fn multiplier(&self) -> f64 {
        match self {
            ComplexityScore::Low => 1.0,
            ComplexityScore::Medium => 1.2,
            ComplexityScore::High => 1.5,
        }
    }
}

// ==========================================
// 系统健康判定 (Health Verdict)
// ==========================================
// 规则: >=2 个数据源不可达 -> Critical, 恰好 1 个 -> Warning, 否则 Healthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthVerdict {
    Healthy,
    Warning,
    Critical,
}

impl fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthVerdict::Healthy => write!(f, "HEALTHY"),
            HealthVerdict::Warning => write!(f, "WARNING"),
            HealthVerdict::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 阶段状态 (Stage Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Completed, // 已完成
    Active,    // 进行中
    Pending,   // 待开始
    Blocked,   // 受阻 (订单延期时的当前阶段)
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Completed => write!(f, "COMPLETED"),
            StageStatus::Active => write!(f, "ACTIVE"),
            StageStatus::Pending => write!(f, "PENDING"),
            StageStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for s in [
            OrderStatus::Planning,
            OrderStatus::DataWork,
            OrderStatus::Processing,
            OrderStatus::Finishing,
            OrderStatus::Completed,
            OrderStatus::Delayed,
        ] {
            assert_eq!(OrderStatus::from_str(s.to_db_str()), s);
        }
    }

    #[test]
    fn test_pipeline_index() {
        assert_eq!(OrderStatus::Planning.pipeline_index(), Some(0));
        assert_eq!(OrderStatus::Completed.pipeline_index(), Some(4));
        assert_eq!(OrderStatus::Delayed.pipeline_index(), None);
    }

    #[test]
    fn test_is_active() {
        assert!(OrderStatus::Processing.is_active());
        assert!(!OrderStatus::Completed.is_active());
        assert!(!OrderStatus::Delayed.is_active());
    }

    #[test]
    fn test_complexity_multiplier() {
        assert_eq!(ComplexityScore::Low.multiplier(), 1.0);
        assert_eq!(ComplexityScore::Medium.multiplier(), 1.2);
        assert_eq!(ComplexityScore::High.multiplier(), 1.5);
    }
}
