//! Gemini Adapters - 调用 Gemini `generateContent` 的上游实现

pub mod client;
mod image_generator;
mod tts_client;
mod vision_analyzer;

pub use client::{GeminiClient, GeminiClientConfig};
pub use image_generator::GeminiImageGenerator;
pub use tts_client::GeminiTtsClient;
pub use vision_analyzer::GeminiVisionAnalyzer;
