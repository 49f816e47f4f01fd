//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{CacheError, ExportError, StorageError, UpstreamError};
use crate::domain::guide::GuideError;
use crate::domain::{DecodeError, EncodeError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 上游服务错误
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// 媒体解码错误
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// 媒体编码错误
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// 缓存错误
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 导出错误
    #[error("Export error: {0}")]
    ExportError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

impl From<GuideError> for ApplicationError {
    fn from(err: GuideError) -> Self {
        match err {
            GuideError::NotAnImage(_) => Self::ValidationError(err.to_string()),
            // 其余均来自模型输出的解码与校验
            other => Self::Upstream(other.into()),
        }
    }
}

impl From<CacheError> for ApplicationError {
    fn from(err: CacheError) -> Self {
        Self::CacheError(err.to_string())
    }
}

impl From<StorageError> for ApplicationError {
    fn from(err: StorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<ExportError> for ApplicationError {
    fn from(err: ExportError) -> Self {
        Self::ExportError(err.to_string())
    }
}
