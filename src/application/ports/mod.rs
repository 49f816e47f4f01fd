//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod export;
mod guide_storage;
mod media_cache;
mod upstream;

pub use export::{ComparisonRendererPort, ExportError, ProtocolExporterPort};
pub use guide_storage::{GuideStoragePort, StorageError, StoredGuide};
pub use media_cache::{CacheError, CacheStats, KeyValueStorePort, MediaCachePort, FEEDBACK_CACHE_KEY};
pub use upstream::{
    GeneratedImage, ImageGeneratorPort, SpeechRequest, TtsEnginePort, UpstreamError,
    VisionAnalyzerPort,
};
