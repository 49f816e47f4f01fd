//! Media Errors - 媒体解码/编码错误

use thiserror::Error;

/// 解码错误
///
/// 图片或音频载荷无法解析，总是向调用方传播，核心变换内部不做替代
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Image decode error: {0}")]
    Image(String),

    #[error("Audio decode error: {0}")]
    Audio(String),
}

/// 编码错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Image encode error: {0}")]
pub struct EncodeError(pub String);
