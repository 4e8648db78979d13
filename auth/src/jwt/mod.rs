pub mod claims;
pub mod errors;
pub mod issuer;
pub mod validator;

pub use claims::Claims;
pub use claims::TokenSubject;
pub use errors::JwtError;
pub use issuer::IssuedToken;
pub use issuer::TokenIssuer;
pub use issuer::SIGNING_ALGORITHM;
pub use validator::TokenValidator;
pub use validator::EXPIRY_LEEWAY_SECS;
