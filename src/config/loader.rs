//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml，或 `--config` 指定的文件）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "MAKEIT";

/// 加载应用配置
///
/// # 环境变量示例
/// - `MAKEIT_GEMINI__API_KEY=...`
/// - `MAKEIT_GEMINI__VOICE=Kore`
/// - `MAKEIT_CACHE__PERSIST_IMAGES=true`
/// - `MAKEIT_OUTPUT__FALLBACK=strict`
///
/// # 参数
/// - `config_path` - 显式指定的配置文件，必须存在；为 None 时搜索默认文件
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值
    builder = builder
        .set_default("gemini.api_key", "")?
        .set_default(
            "gemini.base_url",
            "https://generativelanguage.googleapis.com/v1beta/models",
        )?
        .set_default("gemini.text_model", "gemini-2.5-flash")?
        .set_default("gemini.image_model", "gemini-2.5-flash-image-preview")?
        .set_default("gemini.tts_model", "gemini-2.5-flash-preview-tts")?
        .set_default("gemini.voice", "Puck")?
        .set_default("gemini.timeout_secs", 120)?
        .set_default("cache.persist_images", false)?
        .set_default("cache.db_path", "data/media.sled")?
        .set_default("pacing.delay_ms", 1000)?
        .set_default("output.dir", "output")?
        .set_default("output.fallback", "placeholder")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量，例如 MAKEIT_PACING__DELAY_MS=0
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let gemini = &config.gemini;

    if gemini.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Gemini base URL cannot be empty".to_string(),
        ));
    }

    for (name, model) in [
        ("text_model", &gemini.text_model),
        ("image_model", &gemini.image_model),
        ("tts_model", &gemini.tts_model),
    ] {
        if model.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "gemini.{} cannot be empty",
                name
            )));
        }
    }

    if gemini.voice.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS voice cannot be empty".to_string(),
        ));
    }

    if gemini.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Gemini timeout cannot be 0".to_string(),
        ));
    }

    if config.cache.persist_images && config.cache.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Cache db path cannot be empty when persistence is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Gemini Base URL: {}", config.gemini.base_url);
    tracing::info!(
        "Gemini API Key: {}",
        if config.gemini.api_key.is_empty() { "not set" } else { "set" }
    );
    tracing::info!(
        "Models: text={}, image={}, tts={}",
        config.gemini.text_model,
        config.gemini.image_model,
        config.gemini.tts_model
    );
    tracing::info!("Voice: {}", config.gemini.voice);
    tracing::info!("Timeout: {}s", config.gemini.timeout_secs);
    tracing::info!("Persist Cache: {}", config.cache.persist_images);
    if config.cache.persist_images {
        tracing::info!("Cache Database: {}", config.cache.db_path);
    }
    tracing::info!("Pacing Delay: {}ms", config.pacing.delay_ms);
    tracing::info!("Output Directory: {:?}", config.output.dir);
    tracing::info!("Fallback: {:?}", config.output.fallback);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
