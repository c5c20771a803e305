// ==========================================
// 订单跟踪对账引擎 - 引擎层错误类型
// ==========================================
// 职责: 对账/调度/API 共用的错误分类
// 红线: 单个订单的失败不得波及其他订单的快照与注册表可用性
// ==========================================

use crate::provider::error::ProviderError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 订单主记录缺失: 对账无法继续的唯一"查无记录"错误。
    /// 其余数据源查无记录一律按空列表处理。
    #[error("订单不存在: order_id={order_id}")]
    OrderNotFound { order_id: String },

    /// 数据源故障透传 (仅当订单数据源本身不可达时才从 reconcile 冒出;
    /// 其余数据源的故障在对账内部降级吸收)
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// 调度异常 (定时器未触发/重复注册等), 以该订单的危急告警呈现,
    /// 不抛给无关调用方
    #[error("调度异常: {0}")]
    Scheduling(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_not_found_message() {
        let err = EngineError::OrderNotFound {
            order_id: "Q404".to_string(),
        };
        assert!(err.to_string().contains("Q404"));
    }

    #[test]
    fn test_scheduling_message_prefix() {
        // 调度告警直接展示该消息,前缀用于驾驶舱归类
        let err = EngineError::Scheduling("周期对账失败: order_id=Q1".to_string());
        assert!(err.to_string().starts_with("调度异常"));
    }

    #[test]
    fn test_provider_error_conversion() {
        let provider_err = ProviderError::Unavailable {
            provider: "process".to_string(),
            reason: "连接拒绝".to_string(),
        };
        let engine_err: EngineError = provider_err.into();
        assert!(matches!(engine_err, EngineError::Provider(_)));
    }
}
