//! Gemini Vision Analyzer - 图片理解

use async_trait::async_trait;
use std::sync::Arc;

use super::client::{Content, GeminiClient, GenerateContentRequest, Part};
use crate::application::ports::{UpstreamError, VisionAnalyzerPort};
use crate::domain::guide::UploadedImage;

pub struct GeminiVisionAnalyzer {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiVisionAnalyzer {
    pub fn new(client: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

/// 文本提示 + 内联图片
pub fn analysis_request(prompt: &str, image: &UploadedImage) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part::text(prompt),
                Part::inline(image.mime_type(), image.bytes()),
            ],
        }],
        generation_config: None,
    }
}

#[async_trait]
impl VisionAnalyzerPort for GeminiVisionAnalyzer {
    async fn analyze(&self, prompt: &str, image: &UploadedImage) -> Result<String, UpstreamError> {
        let request = analysis_request(prompt, image);
        let response = self.client.generate_content(&self.model, &request).await?;
        let text = response.first_text()?.to_string();

        tracing::info!(
            model = %self.model,
            text_len = text.len(),
            "Image analyzed"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::encode_png;
    use image::{DynamicImage, RgbaImage};

    #[test]
    fn test_analysis_request_carries_image() {
        let png = encode_png(&DynamicImage::ImageRgba8(RgbaImage::new(2, 2))).unwrap();
        let image = UploadedImage::from_bytes(png).unwrap();

        let json = serde_json::to_value(analysis_request("Identify", &image)).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Identify");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert!(json.get("generationConfig").is_none());
    }
}
