use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::StoreError;
use crate::domain::auth::models::App;
use crate::domain::auth::models::AppId;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::SessionToken;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;

/// Port for authentication operations exposed to transports.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Returns
    /// Store-assigned user id
    ///
    /// # Errors
    /// * `UserAlreadyExists` - Email is already registered (case-insensitive)
    /// * `Unavailable` - Store failed or timed out
    /// * `Internal` - Password hashing failed
    async fn register(&self, command: RegisterCommand) -> Result<UserId, AuthError>;

    /// Verify credentials and issue a token for the requested app.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable),
    ///   or unknown app under `AppLookupPolicy::Conceal`
    /// * `AppNotFound` - Unknown app under `AppLookupPolicy::Reveal`
    /// * `Unavailable` - Store failed or timed out
    async fn login(&self, command: LoginCommand) -> Result<SessionToken, AuthError>;

    /// Report whether a user holds the admin flag.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this id
    /// * `Unavailable` - Store failed or timed out
    async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError>;

    /// Validate a token against the secret of `app_id`.
    ///
    /// # Errors
    /// * `MalformedToken` - Empty or structurally invalid token
    /// * `InvalidSignature` - Signed with another key, for another app, or with another
    ///   algorithm. Also an unknown app under `AppLookupPolicy::Conceal`
    /// * `TokenExpired` - Past `exp` plus the skew tolerance
    /// * `AppNotFound` - Unknown app under `AppLookupPolicy::Reveal`
    async fn validate(&self, token: &str, app_id: AppId) -> Result<auth::Claims, AuthError>;
}

/// Persistence of users and apps: the entire surface the auth core depends on.
///
/// Implementations handle their own locking or transactional isolation and must give
/// read-your-writes per key.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `AlreadyExists` - Email already registered, compared case-insensitively
    /// * `Unavailable` - Store operation failed
    async fn create_user(&self, user: NewUser) -> Result<UserId, StoreError>;

    /// # Errors
    /// * `NotFound` - No user with this email
    /// * `Unavailable` - Store operation failed
    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, StoreError>;

    /// # Errors
    /// * `NotFound` - No user with this id
    /// * `Unavailable` - Store operation failed
    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError>;

    /// # Errors
    /// * `NotFound` - No app with this id
    /// * `Unavailable` - Store operation failed
    async fn get_app_by_id(&self, id: AppId) -> Result<App, StoreError>;
}
