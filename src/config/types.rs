//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::FallbackPolicy;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Gemini 上游配置
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// 媒体缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 上游调用节奏
    #[serde(default)]
    pub pacing: PacingConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// Gemini 配置
#[derive(Clone, Deserialize)]
pub struct GeminiConfig {
    /// API Key，通常通过 `MAKEIT_GEMINI__API_KEY` 提供
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 图片分析与评分
    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// 预置音色名
    #[serde(default = "default_voice")]
    pub voice: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// api_key 不进日志
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("tts_model", &self.tts_model)
            .field("voice", &self.voice)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            tts_model: default_tts_model(),
            voice: default_voice(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// 媒体缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 是否把缓存写入 sled，跨进程复用
    #[serde(default)]
    pub persist_images: bool,

    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persist_images: false,
            db_path: default_db_path(),
        }
    }
}

/// 连续上游调用之间的间隔
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 指南目录的父目录
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// 图片生成失败时的处理方式
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            fallback: FallbackPolicy::default(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别，`RUST_LOG` 优先
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Puck".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_db_path() -> String {
    "data/media.sled".to_string()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_log_level() -> String {
    "info".to_string()
}
