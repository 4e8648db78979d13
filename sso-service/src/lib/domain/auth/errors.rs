use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for plaintext password validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password is required")]
    Empty,
}

/// Error for AppId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppIdError {
    #[error("App id must be positive, got {0}")]
    NotPositive(i32),
}

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("User id must be positive, got {0}")]
    NotPositive(i64),
}

/// Failures reported by a credential store.
///
/// Stores translate their own driver errors into this set; nothing else crosses the port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored record is corrupted: {0}")]
    Corrupted(String),
}

/// Top-level error for all authentication operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // Caller input errors (automatically converted via #[from])
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordError),

    #[error("Invalid app id: {0}")]
    InvalidAppId(#[from] AppIdError),

    #[error("Invalid user id: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    // Domain-level errors
    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("App not found: {0}")]
    AppNotFound(i32),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    // Infrastructure errors
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<auth::JwtError> for AuthError {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::InvalidSignature => AuthError::InvalidSignature,
            auth::JwtError::Expired => AuthError::TokenExpired,
            auth::JwtError::Malformed(detail) => AuthError::MalformedToken(detail),
            auth::JwtError::EncodingFailed(_)
            | auth::JwtError::InvalidKey(_)
            | auth::JwtError::InvalidTtl(_) => AuthError::Internal(err.to_string()),
        }
    }
}
