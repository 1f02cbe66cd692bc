//! Password-reset handshake: a random token handed to the account holder
//! out-of-band, with only its one-way digest and a deadline kept on the
//! record.

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// Random bytes per reset token; hex-encodes to 40 characters.
pub const RESET_TOKEN_BYTES: usize = 20;

/// How long an issued reset token stays usable.
pub const RESET_TOKEN_TTL: Duration = Duration::minutes(10);

/// Stored half of the handshake. Digest and deadline live in one struct
/// so a record can never hold one without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReset {
    /// Hex SHA-256 digest of the plaintext token.
    pub digest: String,
    /// Instant the token stops being accepted.
    pub expires_at: OffsetDateTime,
}

/// A freshly issued reset token. `token` is the plaintext to deliver
/// out-of-band; `pending` is the only part that may be persisted.
#[derive(Debug, Clone)]
pub struct IssuedReset {
    pub token: String,
    pub pending: PendingReset,
}

/// Generates a reset token from the OS RNG and derives its stored form.
///
/// Each call produces a fresh token; stamping the result onto a record
/// replaces any reset that was still pending there.
pub fn issue_reset_token() -> IssuedReset {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    let pending = PendingReset {
        digest: hash_reset_token(&token),
        expires_at: OffsetDateTime::now_utc() + RESET_TOKEN_TTL,
    };
    debug!(expires_at = %pending.expires_at, "reset token issued");
    IssuedReset { token, pending }
}

/// One-way digest of a plaintext reset token, hex-encoded.
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Checks a presented plaintext token against the stored digest.
///
/// The presented token is hashed and the digests are compared in constant
/// time; a token is accepted only strictly before `expires_at`. Expired or
/// non-matching tokens yield `false`, never an error.
pub fn verify_reset_token(presented: &str, pending: &PendingReset, now: OffsetDateTime) -> bool {
    if now >= pending.expires_at {
        return false;
    }
    let presented_digest = hash_reset_token(presented);
    presented_digest
        .as_bytes()
        .ct_eq(pending.digest.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_forty_hex_characters() {
        let issued = issue_reset_token();
        assert_eq!(issued.token.len(), 2 * RESET_TOKEN_BYTES);
        assert!(issued.token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_reproduces_from_the_plaintext() {
        let issued = issue_reset_token();
        assert_eq!(hash_reset_token(&issued.token), issued.pending.digest);
        assert_eq!(issued.pending.digest.len(), 64);
        assert_ne!(issued.token, issued.pending.digest);
    }

    #[test]
    fn expiry_is_ten_minutes_from_issuance() {
        let before = OffsetDateTime::now_utc();
        let issued = issue_reset_token();
        let after = OffsetDateTime::now_utc();

        assert!(issued.pending.expires_at >= before + RESET_TOKEN_TTL);
        assert!(issued.pending.expires_at <= after + RESET_TOKEN_TTL);
    }

    #[test]
    fn consecutive_tokens_differ() {
        let first = issue_reset_token();
        let second = issue_reset_token();
        assert_ne!(first.token, second.token);
        assert_ne!(first.pending.digest, second.pending.digest);
    }

    #[test]
    fn accepts_the_matching_token_before_expiry() {
        let issued = issue_reset_token();
        let now = OffsetDateTime::now_utc();
        assert!(verify_reset_token(&issued.token, &issued.pending, now));
    }

    #[test]
    fn rejects_a_wrong_token() {
        let issued = issue_reset_token();
        let now = OffsetDateTime::now_utc();
        assert!(!verify_reset_token("0".repeat(40).as_str(), &issued.pending, now));
        assert!(!verify_reset_token("", &issued.pending, now));
    }

    #[test]
    fn rejects_at_and_after_the_deadline() {
        let issued = issue_reset_token();
        let deadline = issued.pending.expires_at;
        assert!(!verify_reset_token(&issued.token, &issued.pending, deadline));
        assert!(!verify_reset_token(
            &issued.token,
            &issued.pending,
            deadline + Duration::seconds(1)
        ));
    }
}
