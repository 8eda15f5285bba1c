//! Authentication primitives.
//!
//! - [`password`]: Argon2id password hashing, verification, and registration rules.
//! - [`jwt`]: Session token generation and validation.

pub mod jwt;
pub mod password;
