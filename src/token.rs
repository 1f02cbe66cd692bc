use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::error::CredentialError;

/// JWT payload asserting a record's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // record ID
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}

/// Holds the signing and verification keys plus the token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material is secret and the underlying types expose no Debug.
        f.debug_struct("JwtKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Builds keys from a signing secret and token lifetime. An empty
    /// secret is refused; no token is ever issued unsigned.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, CredentialError> {
        if secret.trim().is_empty() {
            return Err(CredentialError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn from_config(config: &TokenConfig) -> Result<Self, CredentialError> {
        Self::new(&config.secret, config.ttl)
    }

    /// Signs an identity token whose subject is the record id and whose
    /// expiry is issuance time plus the configured lifetime.
    pub fn sign(&self, record_id: Uuid) -> Result<String, CredentialError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: record_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(record_id = %record_id, "jwt signed");
        Ok(token)
    }

    /// Decodes and validates a token, returning its claims. Presented-token
    /// checking normally lives in the authentication middleware; it is
    /// provided here so callers and tests can confirm what was issued.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        debug!(record_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
