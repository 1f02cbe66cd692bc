//! Credential handling for a user record: Argon2 password hashing and
//! verification, HS256 identity-token issuance, and a password-reset
//! handshake (random token delivered out-of-band, one-way digest plus
//! deadline kept on the record).
//!
//! The persistence layer owns the record's lifecycle; this crate is
//! invoked by it before writes ([`password::apply_password_hash`]) and by
//! authentication and reset-flow handlers. [`CredentialManager`] bundles
//! the process-lifetime configuration and offloads hashing onto blocking
//! tasks for async callers; the per-module free functions serve
//! synchronous ones.

pub mod config;
pub mod error;
pub mod manager;
pub mod password;
pub mod reset;
pub mod token;
pub mod user;

pub use config::{CredentialConfig, HashingConfig, TokenConfig};
pub use error::CredentialError;
pub use manager::CredentialManager;
pub use password::{apply_password_hash, hash_password, verify_password};
pub use reset::{hash_reset_token, issue_reset_token, verify_reset_token, IssuedReset, PendingReset};
pub use token::{Claims, JwtKeys};
pub use user::{Role, UserCredentials};
