//! Commands - CQRS 命令定义

mod guide_commands;
pub mod handlers;

pub use guide_commands::{CreateGuide, ExportGuide, ExportScore, ScoreResult};
