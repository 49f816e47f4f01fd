//! Export Command Handlers - 保存指南目录与评分产物

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::commands::{ExportGuide, ExportScore};
use crate::application::error::ApplicationError;
use crate::application::ports::{GuideStoragePort, ProtocolExporterPort};

/// 反馈朗读文件名
pub const FEEDBACK_AUDIO_FILE: &str = "feedback.wav";
/// 对比图文件名
pub const COMPARISON_FILE: &str = "comparison.png";
/// 评分结果文件名
pub const SCORE_FILE: &str = "score.json";

/// 导出指南响应
#[derive(Debug, Clone)]
pub struct ExportGuideResponse {
    pub guide_dir: PathBuf,
    pub html_path: PathBuf,
    pub narration_files: usize,
}

/// ExportGuide Handler
pub struct ExportGuideHandler {
    storage: Arc<dyn GuideStoragePort>,
    exporter: Arc<dyn ProtocolExporterPort>,
}

impl ExportGuideHandler {
    pub fn new(storage: Arc<dyn GuideStoragePort>, exporter: Arc<dyn ProtocolExporterPort>) -> Self {
        Self { storage, exporter }
    }

    pub async fn handle(&self, command: ExportGuide) -> Result<ExportGuideResponse, ApplicationError> {
        let guide_dir = self
            .storage
            .save_guide(&command.protocol, &command.original)
            .await?;

        for narration in &command.narrations {
            self.storage
                .save_file(&format!("step-{}.wav", narration.step_id), &narration.wav)
                .await?;
        }

        let html = self.exporter.render_html(&command.protocol)?;
        let html_path = self
            .storage
            .save_file(&format!("{}.html", command.protocol.file_stem()), html.as_bytes())
            .await?;

        tracing::info!(
            protocol_id = %command.protocol.id,
            guide_dir = %guide_dir.display(),
            narrations = command.narrations.len(),
            "Guide exported"
        );

        Ok(ExportGuideResponse {
            guide_dir,
            html_path,
            narration_files: command.narrations.len(),
        })
    }
}

/// 导出评分响应
#[derive(Debug, Clone)]
pub struct ExportScoreResponse {
    pub feedback_path: PathBuf,
    pub comparison_path: PathBuf,
    pub score_path: PathBuf,
}

/// ExportScore Handler
pub struct ExportScoreHandler {
    storage: Arc<dyn GuideStoragePort>,
}

impl ExportScoreHandler {
    pub fn new(storage: Arc<dyn GuideStoragePort>) -> Self {
        Self { storage }
    }

    pub async fn handle(&self, command: ExportScore) -> Result<ExportScoreResponse, ApplicationError> {
        let score_json = serde_json::to_vec_pretty(&command.analysis)
            .map_err(|e| ApplicationError::ExportError(e.to_string()))?;

        let feedback_path = self
            .storage
            .save_file(FEEDBACK_AUDIO_FILE, &command.feedback_audio)
            .await?;
        let comparison_path = self
            .storage
            .save_file(COMPARISON_FILE, &command.comparison)
            .await?;
        let score_path = self.storage.save_file(SCORE_FILE, &score_json).await?;

        tracing::info!(
            guide_dir = %self.storage.guide_dir().display(),
            "Score exported"
        );

        Ok(ExportScoreResponse {
            feedback_path,
            comparison_path,
            score_path,
        })
    }
}
