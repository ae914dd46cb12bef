//! Authentication and authorization: JWT encode/decode, the Bearer-token
//! middleware, and the pure role-policy functions.

pub mod jwt;
pub mod middleware;
pub mod policy;

pub use jwt::{decode_jwt, encode_jwt, Claims};
pub use middleware::require_auth;
