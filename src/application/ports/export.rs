//! Export Ports - 指南与评分的可分享产物

use thiserror::Error;

use crate::domain::guide::{Protocol, Scorecard};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Render error: {0}")]
    Render(String),
}

/// 将指南渲染为自包含的 HTML 页面
pub trait ProtocolExporterPort: Send + Sync {
    fn render_html(&self, protocol: &Protocol) -> Result<String, ExportError>;
}

/// 标题、原图、成品与雷达图拼成一张对比图（PNG）
pub trait ComparisonRendererPort: Send + Sync {
    fn render(
        &self,
        item_name: &str,
        original: &[u8],
        result: &[u8],
        scorecard: &Scorecard,
    ) -> Result<Vec<u8>, ExportError>;
}
