//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（上游 AI 服务、媒体缓存、指南存储、导出）
//! - commands: 生成指南、评分、导出
//! - queries: 朗读音频
//! - fallback: 图片生成失败时的处理策略
//! - prompts: 提示词模板
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod fallback;
pub mod pacing;
pub mod ports;
pub mod prompts;
pub mod queries;

pub use commands::{
    handlers::{
        CreateGuideHandler, ExportGuideHandler, ExportGuideResponse, ExportScoreHandler,
        ExportScoreResponse, ScoreResultHandler, ScoreResultResponse,
    },
    CreateGuide, ExportGuide, ExportScore, ScoreResult,
};
pub use error::ApplicationError;
pub use fallback::FallbackPolicy;
pub use pacing::Pacing;
pub use queries::{
    handlers::GetNarrationHandler, GetNarrationQuery, NarrationResponse, StepNarration,
};
