//! Guide Command Handlers - 生成指南
//!
//! 分析上传图片，按流程组装 Protocol 并生成配图。远程调用按顺序等待，
//! 商品途径的配图例外：一次并发发出，按请求顺序回填。

use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::application::commands::CreateGuide;
use crate::application::error::ApplicationError;
use crate::application::fallback::FallbackPolicy;
use crate::application::pacing::Pacing;
use crate::application::ports::{ImageGeneratorPort, MediaCachePort, VisionAnalyzerPort};
use crate::application::prompts;
use crate::domain::guide::{
    decode_model_json, CookAnalysis, FindAnalysis, GuideMode, GuideSession, MakeAnalysis,
    Protocol, UploadedImage, Validate,
};
use crate::domain::image::{encode_png, split_composite_nonempty, QUADRANT_COUNT};

/// CreateGuide Handler
pub struct CreateGuideHandler {
    analyzer: Arc<dyn VisionAnalyzerPort>,
    generator: Arc<dyn ImageGeneratorPort>,
    image_cache: Arc<dyn MediaCachePort>,
    pacing: Pacing,
    fallback: FallbackPolicy,
}

impl CreateGuideHandler {
    pub fn new(
        analyzer: Arc<dyn VisionAnalyzerPort>,
        generator: Arc<dyn ImageGeneratorPort>,
        image_cache: Arc<dyn MediaCachePort>,
        pacing: Pacing,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            analyzer,
            generator,
            image_cache,
            pacing,
            fallback,
        }
    }

    /// 新建会话并生成指南
    pub async fn handle(&self, command: CreateGuide) -> Result<GuideSession, ApplicationError> {
        let mut session = GuideSession::new(command.mode, command.photo);

        tracing::info!(
            session_id = %session.id(),
            mode = %command.mode,
            mime_type = %session.original().mime_type(),
            "Creating guide"
        );

        let protocol = match command.mode {
            GuideMode::Make => self.build_make(session.original()).await?,
            GuideMode::Cook => self.build_cook(session.original()).await?,
            GuideMode::Find => self.build_find(session.original()).await?,
        };

        tracing::info!(
            session_id = %session.id(),
            protocol_id = %protocol.id,
            title = %protocol.title,
            steps = protocol.steps.len(),
            "Guide created"
        );

        session.set_protocol(protocol);
        Ok(session)
    }

    async fn analyze<T>(&self, prompt: &str, photo: &UploadedImage) -> Result<T, ApplicationError>
    where
        T: DeserializeOwned + Validate,
    {
        let text = self.analyzer.analyze(prompt, photo).await?;
        Ok(decode_model_json(&text)?)
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ApplicationError> {
        let image = self.generator.generate(prompt).await?;
        tracing::debug!(
            mime_type = %image.mime_type,
            size_bytes = image.data.len(),
            "Image generated"
        );
        Ok(image.data)
    }

    /// 缓存优先的单张配图；只缓存真实生成结果
    async fn cached_image(&self, cache_key: &str, prompt: &str) -> Result<Vec<u8>, ApplicationError> {
        if let Some(bytes) = self.image_cache.get(cache_key).await? {
            tracing::debug!(cache_key = %cache_key, "Image cache hit");
            return Ok(bytes);
        }
        let bytes = self.generate(prompt).await?;
        self.image_cache.put(cache_key, bytes.clone()).await?;
        Ok(bytes)
    }

    async fn build_make(&self, photo: &UploadedImage) -> Result<Protocol, ApplicationError> {
        let analysis: MakeAnalysis = self.analyze(prompts::make_analysis(), photo).await?;
        let mut protocol = Protocol::for_make(&analysis);

        self.pacing.pause().await;
        let materials_prompt = prompts::materials_image(&analysis.item_name, &analysis.materials);
        let materials = self.generate(&materials_prompt).await;
        protocol.materials_image = Some(self.fallback.recover_image("materials", materials)?);

        self.pacing.pause().await;
        let composite_prompt = prompts::make_composite(&analysis.item_name, &analysis.making_steps);
        let quadrants = self
            .generate(&composite_prompt)
            .await
            .and_then(|bytes| split_to_png(&bytes));
        let quadrants = self.fallback.recover_quadrants(quadrants)?;

        for (step, image) in protocol.action_steps_mut().zip(quadrants) {
            step.image = Some(image);
        }

        Ok(protocol)
    }

    async fn build_cook(&self, photo: &UploadedImage) -> Result<Protocol, ApplicationError> {
        let analysis: CookAnalysis = self.analyze(prompts::cook_analysis(), photo).await?;
        let mut protocol = Protocol::for_cook(&analysis);

        for step in protocol.steps.iter_mut() {
            self.pacing.pause().await;
            let prompt = prompts::cook_step_image(&step.instruction);
            let image = self.cached_image(&step.image_cache_key(), &prompt).await;
            step.image = Some(self.fallback.recover_image(&step.title, image)?);
        }

        Ok(protocol)
    }

    async fn build_find(&self, photo: &UploadedImage) -> Result<Protocol, ApplicationError> {
        let analysis: FindAnalysis = self.analyze(prompts::find_analysis(), photo).await?;
        let mut protocol = Protocol::for_find(&analysis);

        self.pacing.pause().await;
        match &analysis {
            FindAnalysis::Landmark {
                item_name, location, ..
            } => {
                let prompt = prompts::landmark_image(item_name, location);
                for step in protocol.steps.iter_mut() {
                    let image = self.cached_image(&step.image_cache_key(), &prompt).await;
                    step.image = Some(self.fallback.recover_image(&step.title, image)?);
                }
            }
            FindAnalysis::Product { item_name, methods } => {
                let requests: Vec<(String, String)> = protocol
                    .steps
                    .iter()
                    .zip(methods)
                    .map(|(step, method)| {
                        (
                            step.image_cache_key(),
                            prompts::product_method_image(item_name, &method.title),
                        )
                    })
                    .collect();

                let results = join_all(
                    requests
                        .iter()
                        .map(|(key, prompt)| self.cached_image(key, prompt)),
                )
                .await;

                for (step, image) in protocol.steps.iter_mut().zip(results) {
                    step.image = Some(self.fallback.recover_image(&step.title, image)?);
                }
            }
        }

        Ok(protocol)
    }
}

/// 切分拼图并把四个象限编码为 PNG
fn split_to_png(bytes: &[u8]) -> Result<[Vec<u8>; QUADRANT_COUNT], ApplicationError> {
    let quadrants = split_composite_nonempty(bytes)?;
    let mut encoded: [Vec<u8>; QUADRANT_COUNT] = Default::default();
    for (slot, quadrant) in encoded.iter_mut().zip(quadrants.iter()) {
        *slot = encode_png(quadrant)?;
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{GeneratedImage, UpstreamError};
    use crate::domain::guide::ProtocolKind;
    use crate::domain::image::decode_image;
    use crate::infrastructure::adapters::fake::{
        CannedFind, CannedRecipe, FakeImageGenerator, FakeVisionAnalyzer, FakeVisionConfig,
    };
    use crate::infrastructure::memory::InMemoryMediaCache;
    use async_trait::async_trait;
    use image::{DynamicImage, GenericImageView, RgbaImage};

    fn photo() -> UploadedImage {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));
        UploadedImage::from_bytes(encode_png(&img).unwrap()).unwrap()
    }

    fn handler_with(
        analyzer: FakeVisionAnalyzer,
        generator: Arc<dyn ImageGeneratorPort>,
        fallback: FallbackPolicy,
    ) -> CreateGuideHandler {
        CreateGuideHandler::new(
            Arc::new(analyzer),
            generator,
            InMemoryMediaCache::new().arc(),
            Pacing::none(),
            fallback,
        )
    }

    fn command(mode: GuideMode) -> CreateGuide {
        CreateGuide {
            mode,
            photo: photo(),
        }
    }

    #[tokio::test]
    async fn test_make_guide_uses_composite_quadrants() {
        let generator = Arc::new(FakeImageGenerator::new());
        let handler = handler_with(
            FakeVisionAnalyzer::with_defaults(),
            generator.clone(),
            FallbackPolicy::Strict,
        );

        let session = handler.handle(command(GuideMode::Make)).await.unwrap();
        let protocol = session.protocol().unwrap();

        assert_eq!(protocol.kind, ProtocolKind::Make);
        assert_eq!(protocol.title, "Lego Starship");
        assert_eq!(protocol.steps.len(), 5);
        assert!(protocol.materials_image.is_some());
        assert!(protocol.materials_step().unwrap().image.is_none());
        for step in protocol.action_steps() {
            let image = decode_image(step.image.as_ref().unwrap()).unwrap();
            assert_eq!(image.dimensions(), (256, 256));
        }
        // materials + composite
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_cook_guide_caches_step_images() {
        let generator = Arc::new(FakeImageGenerator::new());
        let cache = InMemoryMediaCache::new().arc();
        let analyzer = FakeVisionAnalyzer::new(FakeVisionConfig {
            recipe: CannedRecipe::Coffee,
            ..Default::default()
        });
        let handler = CreateGuideHandler::new(
            Arc::new(analyzer),
            generator.clone(),
            cache.clone(),
            Pacing::none(),
            FallbackPolicy::Strict,
        );

        let session = handler.handle(command(GuideMode::Cook)).await.unwrap();
        let protocol = session.protocol().unwrap();
        assert_eq!(protocol.title, "Perfect Coffee");
        assert_eq!(protocol.steps.len(), 4);
        assert!(cache.exists("Boil Water-Boil water to 200°F").await.unwrap());

        handler.handle(command(GuideMode::Cook)).await.unwrap();
        assert_eq!(generator.calls(), 4);
    }

    #[tokio::test]
    async fn test_find_product_keeps_method_order() {
        let handler = handler_with(
            FakeVisionAnalyzer::with_defaults(),
            Arc::new(FakeImageGenerator::new()),
            FallbackPolicy::Strict,
        );

        let session = handler.handle(command(GuideMode::Find)).await.unwrap();
        let protocol = session.protocol().unwrap();
        assert_eq!(protocol.kind, ProtocolKind::Product);
        assert_eq!(protocol.title, "How to get Pepperoni Pizza");

        let titles: Vec<_> = protocol.steps.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Restaurant", "Delivery App", "Grocery Store"]);
        assert!(protocol.steps.iter().all(|s| s.image.is_some()));
    }

    #[tokio::test]
    async fn test_find_landmark() {
        let analyzer = FakeVisionAnalyzer::new(FakeVisionConfig {
            find: CannedFind::Landmark,
            ..Default::default()
        });
        let handler = handler_with(
            analyzer,
            Arc::new(FakeImageGenerator::new()),
            FallbackPolicy::Strict,
        );

        let session = handler.handle(command(GuideMode::Find)).await.unwrap();
        let protocol = session.protocol().unwrap();
        assert_eq!(protocol.title, "How to visit Golden Gate Bridge");
        assert_eq!(protocol.steps.len(), 1);
        assert_eq!(protocol.steps[0].title, "San Francisco, USA");
    }

    #[tokio::test]
    async fn test_placeholder_policy_recovers_image_failures() {
        let handler = handler_with(
            FakeVisionAnalyzer::with_defaults(),
            Arc::new(FakeImageGenerator::failing()),
            FallbackPolicy::Placeholder,
        );

        let session = handler.handle(command(GuideMode::Make)).await.unwrap();
        let protocol = session.protocol().unwrap();
        for step in protocol.action_steps() {
            let image = decode_image(step.image.as_ref().unwrap()).unwrap();
            assert_eq!(image.dimensions(), (256, 256));
        }
    }

    #[tokio::test]
    async fn test_strict_policy_propagates_image_failures() {
        let handler = handler_with(
            FakeVisionAnalyzer::with_defaults(),
            Arc::new(FakeImageGenerator::failing()),
            FallbackPolicy::Strict,
        );

        let err = handler.handle(command(GuideMode::Cook)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Upstream(UpstreamError::Service { .. })));
    }

    /// 返回无法解码的字节
    struct GarbageGenerator;

    #[async_trait]
    impl ImageGeneratorPort for GarbageGenerator {
        async fn generate(&self, _prompt: &str) -> Result<GeneratedImage, UpstreamError> {
            Ok(GeneratedImage {
                data: b"not an image".to_vec(),
                mime_type: "image/png".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_undecodable_composite() {
        let strict = handler_with(
            FakeVisionAnalyzer::with_defaults(),
            Arc::new(GarbageGenerator),
            FallbackPolicy::Strict,
        );
        let err = strict.handle(command(GuideMode::Make)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Decode(_)));

        let lenient = handler_with(
            FakeVisionAnalyzer::with_defaults(),
            Arc::new(GarbageGenerator),
            FallbackPolicy::Placeholder,
        );
        let session = lenient.handle(command(GuideMode::Make)).await.unwrap();
        assert!(session
            .protocol()
            .unwrap()
            .action_steps()
            .all(|s| s.image.is_some()));
    }

    /// 1×1 的拼图
    struct TinyGenerator;

    #[async_trait]
    impl ImageGeneratorPort for TinyGenerator {
        async fn generate(&self, _prompt: &str) -> Result<GeneratedImage, UpstreamError> {
            Ok(GeneratedImage {
                data: encode_png(&DynamicImage::ImageRgba8(RgbaImage::new(1, 1))).unwrap(),
                mime_type: "image/png".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_composite_too_small_to_split() {
        let strict = handler_with(
            FakeVisionAnalyzer::with_defaults(),
            Arc::new(TinyGenerator),
            FallbackPolicy::Strict,
        );
        let err = strict.handle(command(GuideMode::Make)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Decode(_)));
        assert!(err.to_string().contains("1x1"));
    }

    #[tokio::test]
    async fn test_malformed_analysis_always_propagates() {
        let handler = handler_with(
            FakeVisionAnalyzer::with_response("I could not identify anything."),
            Arc::new(FakeImageGenerator::new()),
            FallbackPolicy::Placeholder,
        );
        let err = handler.handle(command(GuideMode::Make)).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Upstream(UpstreamError::MalformedResponse(_))
        ));
    }
}
