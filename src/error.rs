//! Error types shared by the recommendation client and the session.

use crate::session::ViewPhase;
use thiserror::Error;

/// Any failure to obtain a usable generation response.
///
/// The session treats every variant the same way; the variants exist so
/// the client can log what actually went wrong.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("generation service call failed: {0}")]
    Service(#[source] anyhow::Error),

    #[error("no response text received from the generation service")]
    EmptyResponse,

    #[error("response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response does not match the schema: {0}")]
    Schema(String),
}

/// Errors surfaced by session transitions
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// No seed row has both a title and an artist
    #[error("{0}")]
    Validation(String),

    #[error("{action} is not allowed while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: ViewPhase,
    },

    #[error("no recommendation with id {0}")]
    UnknownRecommendation(String),

    #[error("seed row {0} does not exist")]
    UnknownRow(usize),

    /// The generation call failed; the session is now in `Error`
    #[error("{0}")]
    Generation(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
