use thiserror::Error;

/// Error type for token issuance and validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Token lifetime must be at least one second, got {0}s")]
    InvalidTtl(i64),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}
