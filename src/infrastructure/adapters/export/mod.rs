//! Export Adapters - HTML 页面与对比图

mod comparison;
mod protocol_html;

pub use comparison::{ImageprocComparisonRenderer, CANVAS_SIZE};
pub use protocol_html::MiniJinjaProtocolExporter;
