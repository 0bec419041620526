use crate::extract::ParseError;
use crate::FetchError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Rejected before a run starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("no candidate URLs could be resolved")]
    NoCandidates,
    #[error("worker runtime error: {0}")]
    Runtime(String),
}
