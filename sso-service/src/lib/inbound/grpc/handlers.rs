use tonic::Status;

use crate::domain::auth::errors::AuthError;

pub mod is_admin;
pub mod login;
pub mod register;
pub mod validate;

impl From<auth::Claims> for crate::proto::ValidateResponse {
    fn from(claims: auth::Claims) -> Self {
        Self {
            uid: claims.uid,
            email: claims.email,
            app_id: claims.app_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// Infrastructure failures are reported with a generic message; the detail goes to
/// the log only.
impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(_)
            | AuthError::InvalidPassword(_)
            | AuthError::InvalidAppId(_)
            | AuthError::InvalidUserId(_)
            | AuthError::MalformedToken(_) => Status::invalid_argument(err.to_string()),
            AuthError::UserAlreadyExists => Status::already_exists(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::InvalidSignature
            | AuthError::TokenExpired => Status::unauthenticated(err.to_string()),
            AuthError::AppNotFound(_) | AuthError::UserNotFound(_) => {
                Status::not_found(err.to_string())
            }
            AuthError::Unavailable(detail) => {
                tracing::warn!(error = %detail, "Request failed: service unavailable");
                Status::unavailable("service temporarily unavailable")
            }
            AuthError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed: internal error");
                Status::internal("internal error")
            }
        }
    }
}
