//! Stateless service facade bundling the process-lifetime configuration
//! (signing keys, token lifetime, hashing work factor) behind one handle.
//!
//! Hashing and verification run on a blocking thread because Argon2 is
//! CPU-intensive and would stall the async runtime if run directly.

use time::OffsetDateTime;
use tokio::task;
use tracing::error;
use uuid::Uuid;

use crate::config::{CredentialConfig, HashingConfig};
use crate::error::CredentialError;
use crate::password;
use crate::reset::{self, IssuedReset, PendingReset};
use crate::token::{Claims, JwtKeys};
use crate::user::UserCredentials;

/// Configured entry point for every credential operation. Holds no
/// per-call state and is cheap to clone into handlers.
#[derive(Clone, Debug)]
pub struct CredentialManager {
    keys: JwtKeys,
    hashing: HashingConfig,
}

impl CredentialManager {
    pub fn new(config: CredentialConfig) -> Result<Self, CredentialError> {
        Ok(Self {
            keys: JwtKeys::from_config(&config.token)?,
            hashing: config.hashing,
        })
    }

    /// Reads [`CredentialConfig::from_env`] and builds the manager from it.
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::new(CredentialConfig::from_env()?)
    }

    /// Hashes a plaintext password with the configured work factor on a
    /// blocking task.
    pub async fn hash_password(&self, plain: &str) -> Result<String, CredentialError> {
        let plain = plain.to_owned();
        let options = self.hashing;
        task::spawn_blocking(move || password::hash_password_with(&plain, options))
            .await
            .map_err(|e| {
                error!(error = %e, "password hashing task panicked");
                CredentialError::Hashing(format!("hashing task panicked: {e}"))
            })?
    }

    /// Checks a plaintext password against a stored digest on a blocking
    /// task. A wrong password is `Ok(false)`, never an error.
    pub async fn verify_password(
        &self,
        plain: &str,
        digest: &str,
    ) -> Result<bool, CredentialError> {
        let plain = plain.to_owned();
        let digest = digest.to_owned();
        task::spawn_blocking(move || password::verify_password(&plain, &digest))
            .await
            .map_err(|e| {
                error!(error = %e, "password verification task panicked");
                CredentialError::Hashing(format!("verification task panicked: {e}"))
            })?
    }

    /// Async form of the pre-save hook: when the persistence layer reports
    /// the password field changed, the plaintext is replaced with its
    /// digest before the write; otherwise the record is left untouched and
    /// the save proceeds.
    pub async fn prepare_password_for_save(
        &self,
        record: &mut UserCredentials,
        password_changed: bool,
    ) -> Result<(), CredentialError> {
        if !password_changed {
            return Ok(());
        }
        record.password_secret = self.hash_password(&record.password_secret).await?;
        Ok(())
    }

    /// Signs an identity token for the record, expiring after the
    /// configured lifetime.
    pub fn issue_token(&self, record_id: Uuid) -> Result<String, CredentialError> {
        self.keys.sign(record_id)
    }

    /// Decodes and validates an identity token issued by [`Self::issue_token`].
    pub fn verify_token(&self, token: &str) -> Result<Claims, CredentialError> {
        self.keys.verify(token)
    }

    /// Issues a fresh reset handshake; see [`reset::issue_reset_token`].
    pub fn issue_reset_token(&self) -> IssuedReset {
        reset::issue_reset_token()
    }

    /// Checks a presented reset token against the stored half of the
    /// handshake, using the current time as the deadline reference.
    pub fn verify_reset_token(&self, presented: &str, pending: &PendingReset) -> bool {
        reset::verify_reset_token(presented, pending, OffsetDateTime::now_utc())
    }
}
