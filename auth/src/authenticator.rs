use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenSubject;
use crate::jwt::TokenValidator;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and per-app token handling.
///
/// Holds no mutable state; share it behind an `Arc` across request handlers.
#[derive(Debug, Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    decoy_hash: String,
    token_issuer: TokenIssuer,
    token_validator: TokenValidator,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,

    /// Claims embedded in `access_token`
    pub claims: Claims,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator issuing tokens that live for `token_ttl`.
    ///
    /// # Errors
    /// * `JwtError::InvalidTtl` - `token_ttl` is shorter than one second
    /// * `PasswordError` - The decoy hash could not be computed
    pub fn new(token_ttl: Duration) -> Result<Self, AuthenticationError> {
        let password_hasher = PasswordHasher::new();
        let decoy_hash = password_hasher.hash("decoy-password-never-matches")?;

        Ok(Self {
            password_hasher,
            decoy_hash,
            token_issuer: TokenIssuer::new(token_ttl)?,
            token_validator: TokenValidator::new(),
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_issuer.ttl()
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password and, on success, issue a token for `subject` signed with `secret`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - The stored hash could not be parsed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &TokenSubject<'_>,
        secret: &[u8],
    ) -> Result<AuthenticationResult, AuthenticationError> {
        self.authenticate_at(password, stored_hash, subject, secret, Utc::now())
    }

    /// Same as [`Authenticator::authenticate`] with an explicit issuance instant.
    pub fn authenticate_at(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &TokenSubject<'_>,
        secret: &[u8],
        issued_at: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let issued = self.token_issuer.issue_at(subject, secret, issued_at)?;

        Ok(AuthenticationResult {
            access_token: issued.token,
            claims: issued.claims,
        })
    }

    /// Reject a login for which there is no stored hash to check.
    ///
    /// Runs a full verification against a decoy hash first, so the rejection costs the
    /// same as a wrong password.
    pub fn reject_unknown_user(&self, password: &str) -> AuthenticationError {
        let _ = self.password_hasher.verify(password, &self.decoy_hash);
        AuthenticationError::InvalidCredentials
    }

    /// Validate a token against the secret of the app it is presented to.
    pub fn validate_token(&self, token: &str, secret: &[u8]) -> Result<Claims, JwtError> {
        self.token_validator.validate(token, secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            uid: 1,
            email: "alice@example.com",
            app_id: 1,
        }
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = Authenticator::new(Duration::hours(1)).unwrap();
        let hash = authenticator
            .hash_password("Str0ngP@ss")
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate("Str0ngP@ss", &hash, &subject(), SECRET)
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());
        assert_eq!(result.claims.ttl_secs(), 3_600);

        let decoded = authenticator
            .validate_token(&result.access_token, SECRET)
            .expect("Token validation failed");
        assert_eq!(decoded, result.claims);
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = Authenticator::new(Duration::hours(1)).unwrap();
        let hash = authenticator.hash_password("Str0ngP@ss").unwrap();

        let result = authenticator.authenticate("wrong_password", &hash, &subject(), SECRET);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_corrupt_hash() {
        let authenticator = Authenticator::new(Duration::hours(1)).unwrap();

        let result = authenticator.authenticate("Str0ngP@ss", "corrupt", &subject(), SECRET);
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(_))
        ));
    }

    #[test]
    fn test_validate_with_other_secret() {
        let authenticator = Authenticator::new(Duration::hours(1)).unwrap();
        let hash = authenticator.hash_password("Str0ngP@ss").unwrap();
        let result = authenticator
            .authenticate("Str0ngP@ss", &hash, &subject(), SECRET)
            .unwrap();

        let decoded = authenticator.validate_token(&result.access_token, b"other-secret");
        assert_eq!(decoded.unwrap_err(), JwtError::InvalidSignature);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let authenticator = Authenticator::new(Duration::seconds(60)).unwrap();
        let hash = authenticator.hash_password("Str0ngP@ss").unwrap();
        let result = authenticator
            .authenticate_at(
                "Str0ngP@ss",
                &hash,
                &subject(),
                SECRET,
                Utc::now() - Duration::hours(1),
            )
            .unwrap();

        let decoded = authenticator.validate_token(&result.access_token, SECRET);
        assert_eq!(decoded.unwrap_err(), JwtError::Expired);
    }

    #[test]
    fn test_rejects_zero_ttl() {
        assert!(matches!(
            Authenticator::new(Duration::zero()),
            Err(AuthenticationError::JwtError(JwtError::InvalidTtl(0)))
        ));
    }

    #[test]
    fn test_reject_unknown_user_runs_a_real_verification() {
        let authenticator = Authenticator::new(Duration::hours(1)).unwrap();

        assert!(authenticator.decoy_hash.starts_with("$argon2id$"));
        assert!(!authenticator
            .password_hasher
            .verify("Str0ngP@ss", &authenticator.decoy_hash)
            .expect("Decoy hash must parse"));
        assert!(matches!(
            authenticator.reject_unknown_user("Str0ngP@ss"),
            AuthenticationError::InvalidCredentials
        ));
    }
}
