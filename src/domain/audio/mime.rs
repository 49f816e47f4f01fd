//! MIME 参数解析

use lazy_static::lazy_static;
use regex::Regex;

use super::pcm::DEFAULT_SAMPLE_RATE;

lazy_static! {
    static ref RATE_PARAM: Regex = Regex::new(r"rate=(\d+)").expect("valid rate regex");
}

/// 从 `audio/L16;codec=pcm;rate=24000` 这类 MIME 中提取采样率
///
/// 缺失或为 0 时回退到 24000
pub fn sample_rate_from_mime(mime_type: &str) -> u32 {
    RATE_PARAM
        .captures(mime_type)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|rate| *rate > 0)
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

/// 是否为音频 MIME
pub fn is_audio_mime(mime_type: &str) -> bool {
    mime_type.starts_with("audio/")
}
