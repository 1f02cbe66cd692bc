use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::CredentialError;
use crate::reset::PendingReset;

/// Minimum plaintext password length accepted for a new credential.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Access role attached to a credential record. Closed set; anything
/// else is rejected at parse time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Secretary,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Secretary => "secretary",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "secretary" => Ok(Role::Secretary),
            other => Err(CredentialError::Validation(format!("unknown role {other:?}"))),
        }
    }
}

/// Credential fields of a user record.
///
/// The persistence layer owns the record's lifecycle (creation, unique
/// email enforcement, deletion); this crate only validates and transforms
/// the fields below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    /// Plaintext only until the pre-save hook runs; an Argon2 digest at
    /// rest. Never serialized.
    #[serde(skip_serializing)]
    pub password_secret: String,
    /// Digest and deadline of an outstanding password reset, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_reset: Option<PendingReset>,
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub role: Role,
    /// Weak reference to the business this account belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_ref: Option<Uuid>,
}

impl UserCredentials {
    /// Builds a record ready for its first save: fresh v4 id, normalized
    /// email, default role, `created_at` stamped once here. The password
    /// stays plaintext until [`apply_password_hash`](crate::password::apply_password_hash)
    /// runs before the write.
    pub fn new(email: &str, plaintext_password: &str) -> Result<Self, CredentialError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(CredentialError::Validation(format!(
                "invalid email {email:?}"
            )));
        }
        validate_new_password(plaintext_password)?;

        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password_secret: plaintext_password.to_owned(),
            pending_reset: None,
            created_at: OffsetDateTime::now_utc(),
            role: Role::default(),
            business_ref: None,
        })
    }
}

/// Lowercases and trims an address the way registration handlers do
/// before storing it.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Conservative structural check: something@something.tld, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn validate_new_password(plain: &str) -> Result<(), CredentialError> {
    if plain.chars().count() < MIN_PASSWORD_CHARS {
        return Err(CredentialError::Validation(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}
