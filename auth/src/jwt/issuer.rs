use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::claims::TokenSubject;
use super::errors::JwtError;

/// The only algorithm tokens are signed and verified with (HMAC with SHA-256).
///
/// Fixed per build; never read from configuration or from the token header.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// A freshly signed token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs session tokens with an app's secret.
///
/// Issuance is pure computation: nothing is persisted, so a token stays valid until
/// it expires. There is no way to revoke it earlier.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer producing tokens that live for `ttl`.
    ///
    /// # Errors
    /// * `InvalidTtl` - `ttl` is shorter than one second
    pub fn new(ttl: Duration) -> Result<Self, JwtError> {
        if ttl.num_seconds() < 1 {
            return Err(JwtError::InvalidTtl(ttl.num_seconds()));
        }
        Ok(Self { ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` starting now.
    pub fn issue(&self, subject: &TokenSubject<'_>, secret: &[u8]) -> Result<IssuedToken, JwtError> {
        self.issue_at(subject, secret, Utc::now())
    }

    /// Issue a token for `subject` starting at `issued_at`.
    ///
    /// # Errors
    /// * `InvalidKey` - `secret` is empty
    /// * `EncodingFailed` - Serialization or signing failed
    pub fn issue_at(
        &self,
        subject: &TokenSubject<'_>,
        secret: &[u8],
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("secret must be non-empty".to_string()));
        }

        let claims = Claims::new(subject, issued_at.timestamp(), self.ttl.num_seconds());
        let token = encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SECRET: &[u8] = b"app-one-secret";

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            uid: 42,
            email: "alice@example.com",
            app_id: 1,
        }
    }

    #[test]
    fn test_issue_sets_claims_from_ttl() {
        let issuer = TokenIssuer::new(Duration::minutes(30)).unwrap();
        let issued_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let issued = issuer
            .issue_at(&subject(), SECRET, issued_at)
            .expect("Failed to issue token");

        assert_eq!(issued.claims.uid, 42);
        assert_eq!(issued.claims.email, "alice@example.com");
        assert_eq!(issued.claims.app_id, 1);
        assert_eq!(issued.claims.iat, 1_700_000_000);
        assert_eq!(issued.claims.exp, 1_700_001_800);
    }

    #[test]
    fn test_token_is_compact_hs256_jws() {
        let issuer = TokenIssuer::new(Duration::hours(1)).unwrap();
        let issued = issuer.issue(&subject(), SECRET).unwrap();

        assert_eq!(issued.token.split('.').count(), 3);
        let header = jsonwebtoken::decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_different_secrets_give_different_signatures() {
        let issuer = TokenIssuer::new(Duration::hours(1)).unwrap();
        let issued_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let first = issuer.issue_at(&subject(), b"secret-a", issued_at).unwrap();
        let second = issuer.issue_at(&subject(), b"secret-b", issued_at).unwrap();

        assert_eq!(first.claims, second.claims);
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_rejects_empty_secret() {
        let issuer = TokenIssuer::new(Duration::hours(1)).unwrap();
        let result = issuer.issue(&subject(), b"");
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_rejects_non_positive_ttl() {
        assert_eq!(
            TokenIssuer::new(Duration::zero()).unwrap_err(),
            JwtError::InvalidTtl(0)
        );
        assert!(TokenIssuer::new(Duration::seconds(-5)).is_err());
        assert!(TokenIssuer::new(Duration::milliseconds(500)).is_err());
    }
}
