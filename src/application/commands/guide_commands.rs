//! Guide Commands

use crate::application::queries::StepNarration;
use crate::domain::guide::{GuideMode, Protocol, ResultAnalysis, UploadedImage};

/// 根据上传图片生成指南
#[derive(Debug, Clone)]
pub struct CreateGuide {
    pub mode: GuideMode,
    pub photo: UploadedImage,
}

/// 对成品照片评分，针对会话中的指南
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub photo: UploadedImage,
}

/// 保存指南目录
#[derive(Debug, Clone)]
pub struct ExportGuide {
    pub protocol: Protocol,
    pub original: UploadedImage,
    pub narrations: Vec<StepNarration>,
}

/// 保存评分产物
#[derive(Debug, Clone)]
pub struct ExportScore {
    pub analysis: ResultAnalysis,
    pub feedback_audio: Vec<u8>,
    pub comparison: Vec<u8>,
}
