use std::time::Duration;

use argon2::Params;
use serde::Deserialize;

use crate::error::CredentialError;

/// Identity-token lifetime used when `JWT_EXPIRE` is unset.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Token-signing configuration consumed by [`JwtKeys`](crate::token::JwtKeys).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl: Duration,
}

/// Argon2 work factor. The defaults mirror `Argon2::default()` so digests
/// produced without overrides stay interchangeable with it.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_cost_kib: u32,
    /// Iteration count; more iterations, more CPU per hash.
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: Params::DEFAULT_M_COST,
            time_cost: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Everything the credential manager needs for the life of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialConfig {
    pub token: TokenConfig,
    pub hashing: HashingConfig,
}

impl CredentialConfig {
    /// Builds the configuration from environment variables.
    ///
    /// `JWT_SECRET` is required and has no default. `JWT_EXPIRE` accepts
    /// the duration syntax of [`parse_duration`] and defaults to one hour.
    /// `ARGON2_MEMORY_KIB`, `ARGON2_TIME_COST` and `ARGON2_PARALLELISM`
    /// override the work factor.
    pub fn from_env() -> Result<Self, CredentialError> {
        let secret =
            std::env::var("JWT_SECRET").map_err(|_| CredentialError::MissingSecret)?;
        let ttl = match std::env::var("JWT_EXPIRE") {
            Ok(raw) => parse_duration(&raw)?,
            Err(_) => DEFAULT_TOKEN_TTL,
        };

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_cost_kib: env_u32("ARGON2_MEMORY_KIB", defaults.memory_cost_kib)?,
            time_cost: env_u32("ARGON2_TIME_COST", defaults.time_cost)?,
            parallelism: env_u32("ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            token: TokenConfig { secret, ttl },
            hashing,
        })
    }
}

fn env_u32(name: &str, default: u32) -> Result<u32, CredentialError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            CredentialError::Config(format!("{name} must be an integer, got {raw:?}"))
        }),
        Err(_) => Ok(default),
    }
}

/// Parses a duration string: bare seconds (`"3600"`) or an integer with
/// an `s`/`m`/`h`/`d` suffix (`"45s"`, `"30m"`, `"1h"`, `"2d"`).
pub fn parse_duration(raw: &str) -> Result<Duration, CredentialError> {
    let s = raw.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let unit = s
        .chars()
        .last()
        .ok_or_else(|| CredentialError::Config("duration string is empty".into()))?;
    let value: u64 = s[..s.len() - unit.len_utf8()]
        .trim()
        .parse()
        .map_err(|_| CredentialError::Config(format!("invalid duration {raw:?}")))?;

    let secs = match unit.to_ascii_lowercase() {
        's' => Some(value),
        'm' => value.checked_mul(60),
        'h' => value.checked_mul(3_600),
        'd' => value.checked_mul(86_400),
        _ => return Err(CredentialError::Config(format!("invalid duration {raw:?}"))),
    };
    secs.map(Duration::from_secs)
        .ok_or_else(|| CredentialError::Config(format!("duration {raw:?} overflows")))
}
