//! Guide Context - 指南上下文
//!
//! 负责：
//! - 上游分析结果的强类型解码与校验
//! - Protocol 聚合根（步骤与配图）
//! - 成品评分卡
//! - 会话上下文

pub mod analysis;
mod errors;
mod protocol;
mod scorecard;
mod session;
mod value_objects;

pub use analysis::{
    decode_model_json, extract_json_object, AcquisitionMethod, AnalyzedStep, CookAnalysis,
    FindAnalysis, MakeAnalysis, Validate, MAKING_STEP_COUNT,
};
pub use errors::GuideError;
pub use protocol::{materials_instruction, slugify, Protocol, MATERIALS_STEP_ID};
pub use scorecard::{
    CookScores, LandmarkScores, MakeScores, ProductScores, ResultAnalysis, ScoreAxis, Scorecard,
    MAX_SCORE, MIN_SCORE,
};
pub use session::GuideSession;
pub use value_objects::{GuideMode, ProtocolKind, ScoreBand, Step, UploadedImage};
