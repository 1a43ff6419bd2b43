//! Error types for FindMyStage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The document could not be decoded. Always fatal to the request.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The completion call failed or returned an unusable shape.
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// The link-only profile API rejected or failed the submission.
    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Invalid profile transition: {0}")]
    InvalidTransition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
