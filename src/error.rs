//! Custom error types for odrive

use thiserror::Error;

/// Main error type for odrive operations
#[derive(Error, Debug)]
pub enum OdriveError {
    #[error("Not logged in. Run 'odrive --login' first.")]
    MissingCredentials,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Usage(String),
}

impl OdriveError {
    /// Process exit code for this failure kind
    pub fn exit_code(&self) -> i32 {
        match self {
            OdriveError::Usage(_) => 2,
            OdriveError::MissingCredentials => 3,
            OdriveError::Auth(_) => 4,
            OdriveError::Http { .. } => 5,
            OdriveError::Network(_) => 6,
            OdriveError::NotFound(_) => 7,
            OdriveError::Io(_) | OdriveError::Json(_) | OdriveError::Config(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, OdriveError>;
