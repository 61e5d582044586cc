//! Error taxonomy shared by the pipeline and its collaborators.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HotFinderError {
    /// The platform rejected the credential
    #[error("API key rejected by the platform")]
    KeyInvalid,

    /// Rate limit or daily quota hit
    #[error("API quota exceeded")]
    QuotaExceeded,

    /// No credential configured at all
    #[error("No API key available")]
    MissingCredential,

    /// Any other network or HTTP failure
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unsupported sort key: {0}")]
    UnsupportedSortKey(String),

    #[error("Unsupported sort order: {0}")]
    UnsupportedSortOrder(String),

    /// Response envelope is structurally wrong (not an object, etc.)
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Scoring received a record it cannot score
    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Preference store failures
    #[error("Storage error: {0}")]
    Storage(String),
}

impl HotFinderError {
    /// Stable machine-readable name, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            HotFinderError::KeyInvalid => "KEY_INVALID",
            HotFinderError::QuotaExceeded => "QUOTA_EXCEEDED",
            HotFinderError::MissingCredential => "MISSING_CREDENTIAL",
            HotFinderError::Transport(_) => "TRANSPORT_ERROR",
            HotFinderError::UnsupportedSortKey(_) => "UNSUPPORTED_SORT_KEY",
            HotFinderError::UnsupportedSortOrder(_) => "UNSUPPORTED_SORT_ORDER",
            HotFinderError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            HotFinderError::Computation(_) => "COMPUTATION_ERROR",
            HotFinderError::InvalidQuery(_) => "INVALID_QUERY",
            HotFinderError::NotFound(_) => "NOT_FOUND",
            HotFinderError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, HotFinderError>;
