//! Fake TTS Client - 离线语音合成
//!
//! 返回一段正弦提示音，时长随文本长度变化，不实际调用 TTS 服务

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{SpeechRequest, TtsEnginePort, UpstreamError};
use crate::domain::audio::{PcmBuffer, DEFAULT_SAMPLE_RATE};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsConfig {
    pub sample_rate: u32,
    /// 提示音频率（Hz）
    pub frequency_hz: f32,
    /// 每个字符对应的时长（毫秒）
    pub ms_per_char: u32,
    /// 最长时长（毫秒）
    pub max_duration_ms: u32,
}

impl Default for FakeTtsConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frequency_hz: 440.0,
            ms_per_char: 20,
            max_duration_ms: 3000,
        }
    }
}

pub struct FakeTtsClient {
    config: FakeTtsConfig,
    calls: AtomicUsize,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsConfig) -> Self {
        Self {
            config,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeTtsConfig::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tone(&self, text: &str) -> Vec<i16> {
        let chars = text.chars().count() as u32;
        let duration_ms = (chars * self.config.ms_per_char).min(self.config.max_duration_ms);
        let count = (self.config.sample_rate as u64 * duration_ms as u64 / 1000) as usize;
        let step = std::f32::consts::TAU * self.config.frequency_hz / self.config.sample_rate as f32;

        (0..count)
            .map(|i| ((i as f32 * step).sin() * 0.3 * i16::MAX as f32) as i16)
            .collect()
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<PcmBuffer, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            text_len = request.text.len(),
            voice = %request.voice,
            "FakeTtsClient: returning synthetic tone"
        );

        PcmBuffer::mono(self.tone(&request.text), self.config.sample_rate)
            .map_err(|e| UpstreamError::malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tone_length_follows_text() {
        let client = FakeTtsClient::with_defaults();
        let pcm = client
            .synthesize(SpeechRequest {
                text: "x".repeat(10),
                voice: "Puck".to_string(),
            })
            .await
            .unwrap();

        // 10 字符 × 20ms = 200ms @ 24kHz
        assert_eq!(pcm.len(), 4800);
        assert_eq!(pcm.sample_rate(), 24000);
        assert_eq!(pcm.channels(), 1);
    }

    #[tokio::test]
    async fn test_tone_is_capped() {
        let client = FakeTtsClient::with_defaults();
        let pcm = client
            .synthesize(SpeechRequest {
                text: "x".repeat(10_000),
                voice: "Puck".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(pcm.duration_ms(), 3000);
    }
}
