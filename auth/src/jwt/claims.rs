use serde::Deserialize;
use serde::Serialize;

/// Identity a token is issued for: one user logged into one app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSubject<'a> {
    pub uid: i64,
    pub email: &'a str,
    pub app_id: i32,
}

/// Payload of an SSO session token.
///
/// Wire shape (JSON, all timestamps in Unix seconds):
/// `{"uid": 42, "email": "alice@example.com", "app_id": 1, "iat": 1700000000, "exp": 1700003600}`
///
/// Other services decode this payload, so field names are part of the public contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User identifier
    pub uid: i64,

    /// Normalized user email
    pub email: String,

    /// App the token was issued for
    pub app_id: i32,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,
}

impl Claims {
    /// Build claims for a subject issued at `issued_at` and valid for `ttl_secs`.
    pub fn new(subject: &TokenSubject<'_>, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            uid: subject.uid,
            email: subject.email.to_string(),
            app_id: subject.app_id,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }

    /// Lifetime of the token in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.exp.saturating_sub(self.iat)
    }

    /// A token is live while `now < exp + leeway_secs`.
    pub fn is_expired(&self, now: i64, leeway_secs: i64) -> bool {
        now >= self.exp.saturating_add(leeway_secs)
    }
}
