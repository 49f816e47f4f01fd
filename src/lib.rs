//! makeit - 拍照生成制作、烹饪、寻找指南
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Audio: PCM 缓冲与 WAV 编码
//! - Image: 2×2 拼图切分
//! - Guide Context: 指南、分析结果、评分卡
//!
//! 应用层 (application/):
//! - Ports: 端口定义（VisionAnalyzer, ImageGenerator, TtsEngine, MediaCache, GuideStorage, Export）
//! - Commands: 生成指南、评分、导出
//! - Queries: 朗读音频
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: Gemini 客户端、离线 Fake 实现、HTML/对比图导出、文件存储
//! - Memory: DashMap 媒体缓存
//! - Persistence: Sled 键值存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
