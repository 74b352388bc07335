//! Authentication library for the cashbook services.
//!
//! This crate provides HS256 JWT issuing and validation.

mod jwt;
mod claims;

pub use jwt::{bearer_token, decode_token, encode_token, JwtConfig};
pub use claims::{Claims, Role};
