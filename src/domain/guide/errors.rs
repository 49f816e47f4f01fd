//! Guide Context - Errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuideError {
    #[error("No JSON object in model output")]
    MissingJson,

    #[error("Malformed analysis JSON: {0}")]
    MalformedJson(String),

    #[error("Invalid analysis: {0}")]
    InvalidAnalysis(String),

    #[error("Score for {axis} out of range 1-5: {value}")]
    ScoreOutOfRange { axis: &'static str, value: u8 },

    #[error("Not an image upload: {0}")]
    NotAnImage(String),
}
