// ==========================================
// 订单跟踪对账引擎 - 数据源适配层错误类型
// ==========================================
// 职责: 区分"数据源不可达"与"查无记录", 后者不是错误
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 数据源适配层错误类型
#[derive(Error, Debug)]
pub enum ProviderError {
    // ===== 可达性错误 =====
    #[error("数据源不可达: provider={provider}, reason={reason}")]
    Unavailable { provider: String, reason: String },

    #[error("数据源拉取超时: provider={provider}")]
    Timeout { provider: String },

    // ===== 数据库错误 =====
    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProviderError {
    /// 是否属于"数据源本身不可达"一类
    ///
    /// 健康检查依据此判定设置可达性标志; 畸形记录在对账侧按
    /// 形状校验过滤,不走错误通道,也不算不可达。
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            ProviderError::Unavailable { .. }
                | ProviderError::Timeout { .. }
                | ProviderError::DatabaseQueryError(_)
                | ProviderError::LockError(_)
        )
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ProviderError {
    fn from(err: rusqlite::Error) -> Self {
        ProviderError::DatabaseQueryError(err.to_string())
    }
}

/// Result 类型别名
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unreachable() {
        let err = ProviderError::Unavailable {
            provider: "work_hours".to_string(),
            reason: "连接拒绝".to_string(),
        };
        assert!(err.is_unreachable());

        let err = ProviderError::InternalError("订单不存在,无法更新状态".to_string());
        assert!(!err.is_unreachable());
    }
}
