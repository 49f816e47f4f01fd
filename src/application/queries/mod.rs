//! Queries - CQRS 查询定义

pub mod handlers;
mod narration_queries;

pub use narration_queries::{GetNarrationQuery, NarrationResponse, StepNarration};
