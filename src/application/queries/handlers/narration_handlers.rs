//! Narration Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pacing::Pacing;
use crate::application::ports::{MediaCachePort, SpeechRequest, TtsEnginePort};
use crate::application::prompts;
use crate::application::queries::narration_queries::{
    GetNarrationQuery, NarrationResponse, StepNarration,
};
use crate::domain::audio::encode_wav;
use crate::domain::guide::Protocol;

/// GetNarration Handler - 缓存优先，未命中时合成并写入缓存
pub struct GetNarrationHandler {
    tts: Arc<dyn TtsEnginePort>,
    audio_cache: Arc<dyn MediaCachePort>,
    voice: String,
    pacing: Pacing,
}

impl GetNarrationHandler {
    pub fn new(
        tts: Arc<dyn TtsEnginePort>,
        audio_cache: Arc<dyn MediaCachePort>,
        voice: impl Into<String>,
        pacing: Pacing,
    ) -> Self {
        Self {
            tts,
            audio_cache,
            voice: voice.into(),
            pacing,
        }
    }

    pub async fn handle(&self, query: GetNarrationQuery) -> Result<NarrationResponse, ApplicationError> {
        validate(&query)?;

        if let Some(wav) = self.audio_cache.get(&query.cache_key).await? {
            tracing::debug!(cache_key = %query.cache_key, "Narration cache hit");
            return Ok(NarrationResponse {
                wav,
                content_type: "audio/wav".to_string(),
                cache_hit: true,
            });
        }

        self.refresh(query).await
    }

    /// 总是重新合成并覆盖缓存
    pub async fn refresh(&self, query: GetNarrationQuery) -> Result<NarrationResponse, ApplicationError> {
        validate(&query)?;

        let pcm = self
            .tts
            .synthesize(SpeechRequest {
                text: prompts::narration(&query.text),
                voice: self.voice.clone(),
            })
            .await?;
        let duration_ms = pcm.duration_ms();
        let wav = encode_wav(&pcm);

        self.audio_cache.put(&query.cache_key, wav.clone()).await?;

        tracing::info!(
            cache_key = %query.cache_key,
            duration_ms = duration_ms,
            size_bytes = wav.len(),
            "Narration synthesized"
        );

        Ok(NarrationResponse {
            wav,
            content_type: "audio/wav".to_string(),
            cache_hit: false,
        })
    }

    /// 依次为指南的每一步准备朗读，远程调用之间按固定间隔等待
    pub async fn preload(&self, protocol: &Protocol) -> Result<Vec<StepNarration>, ApplicationError> {
        let mut narrations = Vec::with_capacity(protocol.steps.len());
        let mut first_remote = true;

        for step in &protocol.steps {
            let query = GetNarrationQuery::new(&step.instruction, step.narration_cache_key());
            if !self.audio_cache.exists(&query.cache_key).await? {
                if !first_remote {
                    self.pacing.pause().await;
                }
                first_remote = false;
            }
            let response = self.handle(query).await?;
            narrations.push(StepNarration {
                step_id: step.id,
                wav: response.wav,
            });
        }

        tracing::info!(
            protocol_id = %protocol.id,
            steps = narrations.len(),
            "Step narrations preloaded"
        );

        Ok(narrations)
    }
}

fn validate(query: &GetNarrationQuery) -> Result<(), ApplicationError> {
    if query.text.trim().is_empty() {
        return Err(ApplicationError::validation("Narration text is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::parse_wav;
    use crate::domain::guide::{ProtocolKind, Step};
    use crate::infrastructure::adapters::fake::FakeTtsClient;
    use crate::infrastructure::memory::InMemoryMediaCache;

    fn handler(tts: Arc<FakeTtsClient>) -> GetNarrationHandler {
        GetNarrationHandler::new(tts, InMemoryMediaCache::new().arc(), "Puck", Pacing::none())
    }

    #[tokio::test]
    async fn test_cache_first() {
        let tts = Arc::new(FakeTtsClient::with_defaults());
        let handler = handler(tts.clone());

        let first = handler
            .handle(GetNarrationQuery::new("Boil water.", "step-1"))
            .await
            .unwrap();
        assert!(!first.cache_hit);
        let info = parse_wav(&first.wav).unwrap();
        assert_eq!(info.sample_rate, 24000);
        assert_eq!(info.channels, 1);

        let second = handler
            .handle(GetNarrationQuery::new("Boil water.", "step-1"))
            .await
            .unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.wav, first.wav);
        assert_eq!(tts.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_overwrites() {
        let tts = Arc::new(FakeTtsClient::with_defaults());
        let handler = handler(tts.clone());

        let short = handler
            .handle(GetNarrationQuery::new("Hi.", "feedback"))
            .await
            .unwrap();
        let long = handler
            .refresh(GetNarrationQuery::new("Here is your feedback. Much longer.", "feedback"))
            .await
            .unwrap();
        assert!(long.wav.len() > short.wav.len());

        let cached = handler
            .handle(GetNarrationQuery::new("ignored", "feedback"))
            .await
            .unwrap();
        assert_eq!(cached.wav, long.wav);
        assert_eq!(tts.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let tts = Arc::new(FakeTtsClient::with_defaults());
        let err = handler(tts.clone())
            .handle(GetNarrationQuery::new("   ", "step-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert_eq!(tts.calls(), 0);
    }

    #[tokio::test]
    async fn test_preload_all_steps() {
        let tts = Arc::new(FakeTtsClient::with_defaults());
        let handler = handler(tts.clone());

        let mut protocol = Protocol::new(ProtocolKind::Cook, "Coffee", "Coffee");
        protocol.steps = vec![
            Step::new(1, "Boil Water", "Boil water to 200°F"),
            Step::new(2, "Grind Beans", "Grind coffee beans to medium coarse"),
        ];

        let narrations = handler.preload(&protocol).await.unwrap();
        let ids: Vec<_> = narrations.iter().map(|n| n.step_id).collect();
        assert_eq!(ids, [1, 2]);

        handler.preload(&protocol).await.unwrap();
        assert_eq!(tts.calls(), 2);
    }
}
