use thiserror::Error;

/// Errors produced while sampling a target.
///
/// Transport, status, and malformed-response errors are local to a single
/// attempt; whether they end the run is decided by the failure policy.
/// `EmptySampleSet` and `InvalidArgument` are always fatal.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("timeout after {0} seconds")]
    Timeout(u64),

    #[error("connection refused to {0}")]
    ConnectionRefused(String),

    #[error("unexpected status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no valid samples collected; statistics are undefined")]
    EmptySampleSet,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BenchResult<T> = Result<T, BenchError>;
