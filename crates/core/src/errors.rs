use thiserror::Error;

use crate::slot::Slot;

/// 上下文注册表错误类型定义
///
/// 类型化的槽位访问器永远不会失败，这里只覆盖通用（按名称/动态值）接口。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("未知的上下文槽位: {name}")]
    UnknownSlot { name: String },

    #[error("槽位 {slot} 类型不匹配: 期望 {expected}, 实际 {found}")]
    TypeMismatch {
        slot: Slot,
        expected: &'static str,
        found: &'static str,
    },
}

impl ContextError {
    pub fn unknown_slot<S: Into<String>>(name: S) -> Self {
        Self::UnknownSlot { name: name.into() }
    }
}

/// 统一的Result类型
pub type ContextResult<T> = std::result::Result<T, ContextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_error_display() {
        let error = ContextError::unknown_slot("worker_id");
        assert_eq!(error.to_string(), "未知的上下文槽位: worker_id");

        let error = ContextError::TypeMismatch {
            slot: Slot::CronKey,
            expected: "text",
            found: "flag",
        };
        assert_eq!(
            error.to_string(),
            "槽位 cron_key 类型不匹配: 期望 text, 实际 flag"
        );
    }
}
