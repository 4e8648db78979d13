use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;
use super::issuer::SIGNING_ALGORITHM;

/// Clock skew tolerated when checking `exp`, in seconds. Never applied to issuance.
pub const EXPIRY_LEEWAY_SECS: i64 = 5;

/// Verifies tokens against the secret of the app the caller names.
///
/// Only [`SIGNING_ALGORITHM`] is accepted. The `alg` in a token header is compared
/// against it and never used to choose how to verify.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    validation: Validation,
    leeway_secs: i64,
}

impl TokenValidator {
    pub fn new() -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked against an injectable clock in `validate_at`
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            validation,
            leeway_secs: EXPIRY_LEEWAY_SECS,
        }
    }

    /// Validate `token` against `secret` using the current time.
    pub fn validate(&self, token: &str, secret: &[u8]) -> Result<Claims, JwtError> {
        self.validate_at(token, secret, Utc::now().timestamp())
    }

    /// Validate `token` against `secret` as of `now` (Unix seconds).
    ///
    /// # Errors
    /// * `InvalidKey` - `secret` is empty
    /// * `InvalidSignature` - Signature mismatch or a header algorithm other than HS256
    /// * `Malformed` - Not a JWS, missing claims, or `exp` not after `iat`
    /// * `Expired` - `now` is at or past `exp` plus [`EXPIRY_LEEWAY_SECS`]
    pub fn validate_at(&self, token: &str, secret: &[u8], now: i64) -> Result<Claims, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("secret must be non-empty".to_string()));
        }

        let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret), &self.validation)
            .map_err(map_decode_error)?
            .claims;

        if claims.exp <= claims.iat {
            return Err(JwtError::Malformed("exp must be after iat".to_string()));
        }

        if claims.is_expired(now, self.leeway_secs) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

impl Default for TokenValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> JwtError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Malformed(error.to_string()),
    }
}
