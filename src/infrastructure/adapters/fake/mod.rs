//! Fake Adapters - 离线模式与测试使用的上游实现

mod image_generator;
mod tts_client;
mod vision_analyzer;

pub use image_generator::{FakeImageGenerator, FAKE_IMAGE_SIZE};
pub use tts_client::{FakeTtsClient, FakeTtsConfig};
pub use vision_analyzer::{
    CannedFind, CannedQuality, CannedRecipe, FakeVisionAnalyzer, FakeVisionConfig,
};
