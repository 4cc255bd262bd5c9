//! # filevault-auth
//!
//! Credential handling for FileVault.
//!
//! ## Modules
//!
//! - `jwt` — bearer token issuance and validation (HS256)
//! - `password` — Argon2id password hashing and the length policy

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
