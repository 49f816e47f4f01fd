//! Domain Layer - 领域层
//!
//! - audio: PCM 缓冲与 WAV 容器编码
//! - image: 2×2 拼图切分
//! - guide: 指南上下文（分析、Protocol、评分、会话）

pub mod audio;
pub mod guide;
pub mod image;

mod errors;

pub use errors::{DecodeError, EncodeError};
