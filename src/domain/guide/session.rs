//! Guide Context - 会话上下文
//!
//! 一次上传对应一个会话，由调用方持有；新的上传直接替换旧会话。

use uuid::Uuid;

use super::{GuideMode, Protocol, ResultAnalysis, UploadedImage};

#[derive(Debug, Clone)]
pub struct GuideSession {
    id: Uuid,
    mode: GuideMode,
    original: UploadedImage,
    protocol: Option<Protocol>,
    result: Option<ResultAnalysis>,
}

impl GuideSession {
    pub fn new(mode: GuideMode, original: UploadedImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            original,
            protocol: None,
            result: None,
        }
    }

    /// 从已保存的指南恢复会话，用于稍后评分
    pub fn resume(protocol: Protocol, original: UploadedImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: protocol.kind.mode(),
            original,
            protocol: Some(protocol),
            result: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> GuideMode {
        self.mode
    }

    pub fn original(&self) -> &UploadedImage {
        &self.original
    }

    pub fn protocol(&self) -> Option<&Protocol> {
        self.protocol.as_ref()
    }

    pub fn result(&self) -> Option<&ResultAnalysis> {
        self.result.as_ref()
    }

    pub fn set_protocol(&mut self, protocol: Protocol) {
        // 新指南会使旧评分失效
        self.result = None;
        self.protocol = Some(protocol);
    }

    pub fn set_result(&mut self, result: ResultAnalysis) {
        self.result = Some(result);
    }

    pub fn into_protocol(self) -> Option<Protocol> {
        self.protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::guide::ProtocolKind;
    use image::{DynamicImage, RgbaImage};

    fn png() -> UploadedImage {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        let bytes = crate::domain::image::encode_png(&img).unwrap();
        UploadedImage::from_bytes(bytes).unwrap()
    }

    #[test]
    fn test_resume_takes_mode_from_protocol() {
        let protocol = Protocol::new(ProtocolKind::Landmark, "How to visit X", "X");
        let session = GuideSession::resume(protocol, png());
        assert_eq!(session.mode(), GuideMode::Find);
        assert!(session.protocol().is_some());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_new_protocol_clears_result() {
        let mut session = GuideSession::new(GuideMode::Cook, png());
        session.set_protocol(Protocol::new(ProtocolKind::Cook, "Toast", "Toast"));
        let text = r#"{"scores": {"color": 4, "texture": 3, "ingredients": 5, "presentation": 4,
            "portion": 4}, "feedback": "Crisp."}"#;
        session.set_result(ResultAnalysis::decode(ProtocolKind::Cook, text).unwrap());
        assert!(session.result().is_some());

        session.set_protocol(Protocol::new(ProtocolKind::Cook, "Bagel", "Bagel"));
        assert!(session.result().is_none());
    }
}
