//! Guide Context - Value Objects

use serde::{Deserialize, Serialize};

use super::GuideError;
use crate::domain::image::sniff_image_mime;

/// 上传流程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideMode {
    /// 照着图片做出来
    Make,
    /// 照着菜品图片做菜
    Cook,
    /// 找到图片里的东西（商品或地标）
    Find,
}

impl std::fmt::Display for GuideMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuideMode::Make => write!(f, "make"),
            GuideMode::Cook => write!(f, "cook"),
            GuideMode::Find => write!(f, "find"),
        }
    }
}

/// 指南类型，决定步骤布局与评分维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    Make,
    Cook,
    Product,
    Landmark,
}

impl ProtocolKind {
    pub fn mode(&self) -> GuideMode {
        match self {
            ProtocolKind::Make => GuideMode::Make,
            ProtocolKind::Cook => GuideMode::Cook,
            ProtocolKind::Product | ProtocolKind::Landmark => GuideMode::Find,
        }
    }
}

/// 指南中的一步
///
/// 图片字节不参与序列化，由存储层单独落盘
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: u32,
    pub title: String,
    pub instruction: String,
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

impl Step {
    pub fn new(id: u32, title: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            instruction: instruction.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// 配图缓存 key：`"{title}-{instruction}"`
    pub fn image_cache_key(&self) -> String {
        format!("{}-{}", self.title, self.instruction)
    }

    /// 朗读缓存 key：`"step-{id}"`
    pub fn narration_cache_key(&self) -> String {
        format!("step-{}", self.id)
    }
}

/// 用户上传的图片
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    mime_type: String,
}

impl UploadedImage {
    /// 根据内容嗅探格式，非图片直接拒绝
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, GuideError> {
        let mime_type = sniff_image_mime(&bytes)
            .map_err(|e| GuideError::NotAnImage(e.to_string()))?
            .to_string();
        Ok(Self { bytes, mime_type })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// 分数档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Excellent,
    Good,
    Poor,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        if score >= 4 {
            ScoreBand::Excellent
        } else if score >= 3 {
            ScoreBand::Good
        } else {
            ScoreBand::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_band() {
        assert_eq!(ScoreBand::of(5), ScoreBand::Excellent);
        assert_eq!(ScoreBand::of(4), ScoreBand::Excellent);
        assert_eq!(ScoreBand::of(3), ScoreBand::Good);
        assert_eq!(ScoreBand::of(1), ScoreBand::Poor);
    }

    #[test]
    fn test_uploaded_image_rejects_text() {
        let err = UploadedImage::from_bytes(b"hello".to_vec()).unwrap_err();
        assert!(matches!(err, GuideError::NotAnImage(_)));
    }

    #[test]
    fn test_kind_mode() {
        assert_eq!(ProtocolKind::Landmark.mode(), GuideMode::Find);
        assert_eq!(ProtocolKind::Cook.mode(), GuideMode::Cook);
    }
}
