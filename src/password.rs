use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::HashingConfig;
use crate::error::CredentialError;
use crate::user::UserCredentials;

/// Hashes a plaintext password into a salted Argon2id PHC string using
/// the default work factor.
pub fn hash_password(plain: &str) -> Result<String, CredentialError> {
    hash_password_with(plain, HashingConfig::default())
}

/// Hashes with an explicit work factor. The PHC string encodes its own
/// salt and parameters, so verification needs no configuration.
pub fn hash_password_with(
    plain: &str,
    options: HashingConfig,
) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = hasher(options)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            CredentialError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(digest)
}

fn hasher(options: HashingConfig) -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(
        options.memory_cost_kib,
        options.time_cost,
        options.parallelism,
        None,
    )
    .map_err(|e| CredentialError::Hashing(format!("work factor rejected: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Verifies a plaintext password against a stored digest.
///
/// A malformed digest is an error; a well-formed digest that simply does
/// not match is `Ok(false)`.
pub fn verify_password(plain: &str, digest: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(digest).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        CredentialError::Hashing(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Pre-save hook. The persistence layer reports whether the password
/// field changed since the last durable write; only then is the plaintext
/// replaced by its digest, so an already-hashed value is never hashed
/// again. With `password_changed` false the call is a no-op and the save
/// proceeds with the stored digest untouched.
///
/// A hashing failure leaves the record unmodified and propagates, so the
/// caller aborts the write instead of persisting plaintext.
pub fn apply_password_hash(
    record: &mut UserCredentials,
    password_changed: bool,
) -> Result<(), CredentialError> {
    if !password_changed {
        return Ok(());
    }
    let digest = hash_password(&record.password_secret)?;
    record.password_secret = digest;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, CredentialError::Hashing(_)));
    }

    #[test]
    fn digest_is_salted_phc_and_never_contains_the_plaintext() {
        let password = "secret1";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains(password));
    }

    #[test]
    fn same_password_hashes_to_distinct_digests() {
        let password = "secret1";
        let first = hash_password(password).expect("first hash");
        let second = hash_password(password).expect("second hash");
        assert_ne!(first, second);
        assert!(verify_password(password, &first).expect("first verifies"));
        assert!(verify_password(password, &second).expect("second verifies"));
    }

    #[test]
    fn custom_work_factor_travels_inside_the_digest() {
        let options = HashingConfig {
            memory_cost_kib: 256,
            time_cost: 1,
            parallelism: 1,
        };
        let hash = hash_password_with("secret1", options).expect("hashing should succeed");
        assert!(hash.contains("m=256,t=1,p=1"));
        // default verifier reads the parameters back out of the string
        assert!(verify_password("secret1", &hash).expect("verify should succeed"));
    }

    #[test]
    fn zero_work_factor_is_rejected() {
        let options = HashingConfig {
            memory_cost_kib: 0,
            time_cost: 0,
            parallelism: 0,
        };
        let err = hash_password_with("secret1", options).unwrap_err();
        assert!(matches!(err, CredentialError::Hashing(_)));
    }

    #[test]
    fn save_hook_hashes_only_when_the_password_changed() {
        let mut record =
            UserCredentials::new("ana@example.com", "secret1").expect("valid record");

        apply_password_hash(&mut record, true).expect("hashing should succeed");
        assert_ne!(record.password_secret, "secret1");
        assert!(verify_password("secret1", &record.password_secret).expect("verifies"));
        assert!(!verify_password("wrong", &record.password_secret).expect("no error"));

        // unrelated re-save: flag is false, stored digest must not move
        let stored = record.password_secret.clone();
        apply_password_hash(&mut record, false).expect("no-op should succeed");
        assert_eq!(record.password_secret, stored);
    }
}
