//! 错误类型定义

use thiserror::Error;

/// 核心错误类型
///
/// 注册表的各项操作本身不会失败，这里只覆盖从字符串解析身份时的错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("无效的设备类型: {value}")]
    InvalidKind { value: String },

    #[error("无效的设备身份: {value}，应为 KIND:KEY 格式")]
    InvalidIdentity { value: String },
}

impl CoreError {
    /// 创建设备类型错误
    pub fn invalid_kind<S: Into<String>>(value: S) -> Self {
        Self::InvalidKind {
            value: value.into(),
        }
    }

    /// 创建设备身份错误
    pub fn invalid_identity<S: Into<String>>(value: S) -> Self {
        Self::InvalidIdentity {
            value: value.into(),
        }
    }
}
