//! Gemini Image Generator - 图片生成

use async_trait::async_trait;
use std::sync::Arc;

use super::client::{
    Content, GeminiClient, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::application::ports::{GeneratedImage, ImageGeneratorPort, UpstreamError};

pub struct GeminiImageGenerator {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiImageGenerator {
    pub fn new(client: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

pub fn image_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part::text(prompt)],
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["IMAGE".to_string()],
            speech_config: None,
        }),
    }
}

/// 取出第一段 inline 图片
pub fn extract_image(response: &GenerateContentResponse) -> Result<GeneratedImage, UpstreamError> {
    let inline = response.first_inline_data()?;
    if !inline.mime_type.starts_with("image/") {
        return Err(UpstreamError::malformed(format!(
            "expected image data, got {}",
            inline.mime_type
        )));
    }
    Ok(GeneratedImage {
        data: inline.decode()?,
        mime_type: inline.mime_type.clone(),
    })
}

#[async_trait]
impl ImageGeneratorPort for GeminiImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, UpstreamError> {
        let response = self
            .client
            .generate_content(&self.model, &image_request(prompt))
            .await?;
        let image = extract_image(&response)?;

        tracing::info!(
            model = %self.model,
            mime_type = %image.mime_type,
            size_bytes = image.data.len(),
            "Image generated"
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::gemini::client::parse_response;

    #[test]
    fn test_image_request_modalities() {
        let json = serde_json::to_value(image_request("A bridge")).unwrap();
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
        assert!(json["generationConfig"].get("speechConfig").is_none());
    }

    #[test]
    fn test_extract_image() {
        let body = br#"{"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": "iVBORw=="}}]}}]}"#;
        let image = extract_image(&parse_response(body).unwrap()).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(&image.data[..4], b"\x89PNG");
    }

    #[test]
    fn test_extract_rejects_audio() {
        let body = br#"{"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "audio/L16;rate=24000", "data": "AAA="}}]}}]}"#;
        assert!(extract_image(&parse_response(body).unwrap()).is_err());
    }
}
