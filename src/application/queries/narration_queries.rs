//! Narration Queries - 朗读音频查询

/// 获取一段文本的朗读音频（WAV）
#[derive(Debug, Clone)]
pub struct GetNarrationQuery {
    pub text: String,
    pub cache_key: String,
}

impl GetNarrationQuery {
    pub fn new(text: impl Into<String>, cache_key: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cache_key: cache_key.into(),
        }
    }
}

/// 朗读音频响应
#[derive(Debug, Clone)]
pub struct NarrationResponse {
    pub wav: Vec<u8>,
    pub content_type: String,
    pub cache_hit: bool,
}

/// 某一步的朗读音频
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNarration {
    pub step_id: u32,
    pub wav: Vec<u8>,
}
