//! Upstream Ports - 生成式 AI 服务抽象
//!
//! 三个出站端口：图片理解（返回 JSON 文本）、图片生成、语音合成。
//! 具体实现在 infrastructure/adapters 层（HTTP 与离线假实现）。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::PcmBuffer;
use crate::domain::guide::{GuideError, UploadedImage};

/// 上游服务错误
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {status} {message}")]
    Service { status: u16, message: String },

    #[error("Upstream not configured: {0}")]
    NotConfigured(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl UpstreamError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}

impl From<GuideError> for UpstreamError {
    fn from(err: GuideError) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// 图片理解端口
///
/// 发送提示词与图片，返回模型的原始文本，由调用方截取并校验 JSON
#[async_trait]
pub trait VisionAnalyzerPort: Send + Sync {
    async fn analyze(&self, prompt: &str, image: &UploadedImage) -> Result<String, UpstreamError>;
}

/// 生成的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// 图片生成端口
#[async_trait]
pub trait ImageGeneratorPort: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, UpstreamError>;
}

/// 语音合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 要合成的文本（不含语气前缀）
    pub text: String,
    /// 预置音色名
    pub voice: String,
}

/// TTS Engine Port
///
/// 返回原始 PCM，WAV 封装在应用层完成
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest) -> Result<PcmBuffer, UpstreamError>;

    /// 检查 TTS 服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
