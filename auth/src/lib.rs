//! Credential and session token engine for the SSO service.
//!
//! - Password hashing (Argon2id)
//! - Per-app token issuance and validation (HS256, app secret as key)
//! - Authentication coordination
//!
//! Everything here is pure computation. Looking up users, apps and their secrets is
//! the caller's job.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("not_my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenIssuer, TokenSubject, TokenValidator};
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(Duration::hours(1)).unwrap();
//! let subject = TokenSubject { uid: 1, email: "alice@example.com", app_id: 1 };
//! let issued = issuer.issue(&subject, b"app-secret").unwrap();
//!
//! let claims = TokenValidator::new().validate(&issued.token, b"app-secret").unwrap();
//! assert_eq!(claims.uid, 1);
//! assert!(TokenValidator::new().validate(&issued.token, b"other-app").is_err());
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenSubject};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(Duration::hours(1)).unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let subject = TokenSubject { uid: 1, email: "alice@example.com", app_id: 1 };
//! let result = auth.authenticate("password123", &hash, &subject, b"app-secret").unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token, b"app-secret").unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenIssuer;
pub use jwt::TokenSubject;
pub use jwt::TokenValidator;
pub use password::PasswordError;
pub use password::PasswordHasher;
