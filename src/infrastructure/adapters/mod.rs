//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod export;
pub mod fake;
pub mod gemini;
pub mod storage;

pub use export::{ImageprocComparisonRenderer, MiniJinjaProtocolExporter};
pub use gemini::{GeminiClient, GeminiImageGenerator, GeminiTtsClient, GeminiVisionAnalyzer};
pub use storage::FileGuideStorage;
