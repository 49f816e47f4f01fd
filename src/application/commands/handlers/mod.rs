//! Command Handlers 实现

mod export_handlers;
mod guide_handlers;
mod score_handlers;

pub use export_handlers::*;
pub use guide_handlers::*;
pub use score_handlers::*;
