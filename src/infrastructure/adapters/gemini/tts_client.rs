//! Gemini TTS Client - 语音合成
//!
//! 上游返回 base64 的裸 PCM（16 位单声道），采样率写在 MIME 参数里，
//! 例如 `audio/L16;codec=pcm;rate=24000`

use async_trait::async_trait;
use std::sync::Arc;

use super::client::{
    Content, GeminiClient, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    PrebuiltVoiceConfig, SpeechConfig, VoiceConfig,
};
use crate::application::ports::{SpeechRequest, TtsEnginePort, UpstreamError};
use crate::application::prompts;
use crate::domain::audio::{is_audio_mime, sample_rate_from_mime, PcmBuffer};

pub struct GeminiTtsClient {
    client: Arc<GeminiClient>,
    model: String,
}

impl GeminiTtsClient {
    pub fn new(client: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

/// 请求文本已带语气前缀时不再重复添加
pub fn speech_request(request: &SpeechRequest) -> GenerateContentRequest {
    let text = if request.text.starts_with(prompts::NARRATION_TONE_PREFIX) {
        request.text.clone()
    } else {
        prompts::narration(&request.text)
    };

    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part::text(text)],
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["AUDIO".to_string()],
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: request.voice.clone(),
                    },
                },
            }),
        }),
    }
}

/// 取出第一段 inline 音频并解释为 PCM
pub fn extract_pcm(response: &GenerateContentResponse) -> Result<PcmBuffer, UpstreamError> {
    let inline = response.first_inline_data()?;
    if !is_audio_mime(&inline.mime_type) {
        return Err(UpstreamError::malformed(format!(
            "expected audio data, got {}",
            inline.mime_type
        )));
    }
    let sample_rate = sample_rate_from_mime(&inline.mime_type);
    let bytes = inline.decode()?;
    PcmBuffer::from_le_bytes(&bytes, 1, sample_rate).map_err(|e| UpstreamError::malformed(e.to_string()))
}

#[async_trait]
impl TtsEnginePort for GeminiTtsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<PcmBuffer, UpstreamError> {
        let response = self
            .client
            .generate_content(&self.model, &speech_request(&request))
            .await?;
        let pcm = extract_pcm(&response)?;

        tracing::info!(
            model = %self.model,
            voice = %request.voice,
            sample_rate = pcm.sample_rate(),
            duration_ms = pcm.duration_ms(),
            "Speech synthesized"
        );
        Ok(pcm)
    }
}
