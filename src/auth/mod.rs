//! Authentication module: credential hashing, session tokens and the request gate

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{JwtService, SessionClaims, SessionIdentity, TokenError};
pub use middleware::{authorize, extract_token, jwt_auth_middleware, AuthContext};
pub use password::PasswordHasher;
