use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::TokenSubject;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::StoreError;
use crate::domain::auth::models::AppId;
use crate::domain::auth::models::AppLookupPolicy;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::PasswordHash;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::SessionToken;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::CredentialStore;

/// Default deadline for a single credential store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Domain service implementation for authentication.
///
/// Stateless between requests: users and apps live in the injected store, and the
/// authenticator is immutable. Failures are terminal per request; nothing is retried.
pub struct AuthService<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    authenticator: Arc<Authenticator>,
    app_lookup_policy: AppLookupPolicy,
    store_timeout: Duration,
}

impl<CS> AuthService<CS>
where
    CS: CredentialStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// Starts with `AppLookupPolicy::Conceal` and [`DEFAULT_STORE_TIMEOUT`].
    pub fn new(store: Arc<CS>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
            app_lookup_policy: AppLookupPolicy::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_app_lookup_policy(mut self, policy: AppLookupPolicy) -> Self {
        self.app_lookup_policy = policy;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Run a store call under the store deadline. On timeout the call is dropped,
    /// which cancels whatever I/O it had in flight.
    async fn call_store<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Credential store call timed out"
                );
                Err(StoreError::Unavailable(format!("{operation} timed out")))
            }
        }
    }

    /// Spend a password verification's worth of work, then answer as for a wrong password.
    fn reject_unknown_user(&self, command: &LoginCommand) -> AuthError {
        let _ = self
            .authenticator
            .reject_unknown_user(command.password.expose());
        AuthError::InvalidCredentials
    }

    fn unknown_app(&self, app_id: AppId, concealed: impl FnOnce() -> AuthError) -> AuthError {
        match self.app_lookup_policy {
            AppLookupPolicy::Conceal => concealed(),
            AppLookupPolicy::Reveal => AuthError::AppNotFound(app_id.0),
        }
    }
}

/// Translate store failures that the calling operation does not expect.
fn store_failure(operation: &'static str, err: StoreError) -> AuthError {
    tracing::error!(operation, error = %err, "Credential store call failed");
    match err {
        StoreError::Unavailable(detail) => AuthError::Unavailable(detail),
        other => AuthError::Internal(other.to_string()),
    }
}

#[async_trait]
impl<CS> AuthServicePort for AuthService<CS>
where
    CS: CredentialStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<UserId, AuthError> {
        let password_hash = self
            .authenticator
            .hash_password(command.password.expose())
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                AuthError::Internal("password hashing failed".to_string())
            })?;

        let new_user = NewUser {
            email: command.email,
            password_hash: PasswordHash::new(password_hash),
            created_at: Utc::now(),
        };

        let user_id = self
            .call_store("create_user", self.store.create_user(new_user))
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists(_) => AuthError::UserAlreadyExists,
                other => store_failure("create_user", other),
            })?;

        tracing::info!(user_id = %user_id, "User registered");
        Ok(user_id)
    }

    async fn login(&self, command: LoginCommand) -> Result<SessionToken, AuthError> {
        // App first: under Reveal the answer for an unknown app must not depend on the email
        let app = match self
            .call_store("get_app_by_id", self.store.get_app_by_id(command.app_id))
            .await
        {
            Ok(app) => app,
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(app_id = %command.app_id, reason = "unknown app", "Login rejected");
                return Err(self.unknown_app(command.app_id, || {
                    self.reject_unknown_user(&command)
                }));
            }
            Err(e) => return Err(store_failure("get_app_by_id", e)),
        };

        let user = match self
            .call_store("get_user_by_email", self.store.get_user_by_email(&command.email))
            .await
        {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(app_id = %app.id, reason = "unknown email", "Login rejected");
                return Err(self.reject_unknown_user(&command));
            }
            Err(e) => return Err(store_failure("get_user_by_email", e)),
        };

        let subject = TokenSubject {
            uid: user.id.0,
            email: user.email.as_str(),
            app_id: app.id.0,
        };

        let result = self
            .authenticator
            .authenticate(
                command.password.expose(),
                user.password_hash.as_str(),
                &subject,
                app.secret.as_bytes(),
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::debug!(user_id = %user.id, app_id = %app.id, reason = "wrong password", "Login rejected");
                    AuthError::InvalidCredentials
                }
                AuthenticationError::PasswordError(err) => {
                    tracing::error!(user_id = %user.id, error = %err, "Stored password hash is unreadable");
                    AuthError::Internal("credential verification failed".to_string())
                }
                AuthenticationError::JwtError(err) => {
                    tracing::error!(app_id = %app.id, error = %err, "Token issuance failed");
                    AuthError::from(err)
                }
            })?;

        tracing::info!(user_id = %user.id, app_id = %app.id, "User logged in");
        Ok(SessionToken {
            token: result.access_token,
            claims: result.claims,
        })
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError> {
        match self
            .call_store("get_user_by_id", self.store.get_user_by_id(user_id))
            .await
        {
            Ok(user) => Ok(user.is_admin),
            Err(StoreError::NotFound(_)) => Err(AuthError::UserNotFound(user_id.0)),
            Err(e) => Err(store_failure("get_user_by_id", e)),
        }
    }

    async fn validate(&self, token: &str, app_id: AppId) -> Result<auth::Claims, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MalformedToken("token is required".to_string()));
        }

        let app = match self
            .call_store("get_app_by_id", self.store.get_app_by_id(app_id))
            .await
        {
            Ok(app) => app,
            Err(StoreError::NotFound(_)) => {
                return Err(self.unknown_app(app_id, || AuthError::InvalidSignature));
            }
            Err(e) => return Err(store_failure("get_app_by_id", e)),
        };

        let claims = self
            .authenticator
            .validate_token(token, app.secret.as_bytes())?;

        // The payload must name the app whose secret verified it
        if claims.app_id != app.id.0 {
            return Err(AuthError::InvalidSignature);
        }

        Ok(claims)
    }
}
