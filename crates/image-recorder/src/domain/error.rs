use core::error::Error;
use std::path::PathBuf;

/// Fatal startup misconfiguration.
#[derive(Debug, derive_more::Display)]
pub enum ConfigError {
    #[display("Image match pattern is empty")]
    EmptyPattern,
    #[display("Invalid image match pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[display("Cannot determine record file location: {message}")]
    RecordFile { message: String },
}

impl Error for ConfigError {}

/// Failure to hand one change record to its sink.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("Failed to serialize change record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write change record to stdout: {0}")]
    Stdout(#[source] std::io::Error),

    #[error("Failed to append change record to `{}`: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
