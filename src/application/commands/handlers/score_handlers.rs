//! Score Command Handlers - 成品评分

use std::sync::Arc;

use crate::application::commands::ScoreResult;
use crate::application::error::ApplicationError;
use crate::application::pacing::Pacing;
use crate::application::ports::{ComparisonRendererPort, VisionAnalyzerPort, FEEDBACK_CACHE_KEY};
use crate::application::prompts;
use crate::application::queries::handlers::GetNarrationHandler;
use crate::application::queries::GetNarrationQuery;
use crate::domain::guide::{GuideSession, ResultAnalysis};

/// 评分响应
#[derive(Debug, Clone)]
pub struct ScoreResultResponse {
    pub analysis: ResultAnalysis,
    /// 反馈朗读（WAV）
    pub feedback_audio: Vec<u8>,
    /// 对比图（PNG）
    pub comparison: Vec<u8>,
}

/// ScoreResult Handler
pub struct ScoreResultHandler {
    analyzer: Arc<dyn VisionAnalyzerPort>,
    narration: Arc<GetNarrationHandler>,
    renderer: Arc<dyn ComparisonRendererPort>,
    pacing: Pacing,
}

impl ScoreResultHandler {
    pub fn new(
        analyzer: Arc<dyn VisionAnalyzerPort>,
        narration: Arc<GetNarrationHandler>,
        renderer: Arc<dyn ComparisonRendererPort>,
        pacing: Pacing,
    ) -> Self {
        Self {
            analyzer,
            narration,
            renderer,
            pacing,
        }
    }

    /// 针对会话中的指南评分，结果写回会话
    pub async fn handle(
        &self,
        session: &mut GuideSession,
        command: ScoreResult,
    ) -> Result<ScoreResultResponse, ApplicationError> {
        let protocol = session
            .protocol()
            .ok_or_else(|| ApplicationError::invalid_state("No guide to score against"))?;

        let prompt = prompts::score_result(protocol);
        let text = self.analyzer.analyze(&prompt, &command.photo).await?;
        let analysis = ResultAnalysis::decode(protocol.kind, &text)?;

        tracing::info!(
            session_id = %session.id(),
            protocol_id = %protocol.id,
            average = analysis.scores.average(),
            "Result scored"
        );

        // 反馈每次都重新朗读，覆盖旧的 feedback 缓存
        self.pacing.pause().await;
        let feedback = self
            .narration
            .refresh(GetNarrationQuery::new(
                analysis.narration_text(),
                FEEDBACK_CACHE_KEY,
            ))
            .await?;

        let comparison = self.renderer.render(
            &protocol.item_name,
            session.original().bytes(),
            command.photo.bytes(),
            &analysis.scores,
        )?;

        session.set_result(analysis.clone());

        Ok(ScoreResultResponse {
            analysis,
            feedback_audio: feedback.wav,
            comparison,
        })
    }
}
