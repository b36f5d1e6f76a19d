//! Application Configuration
//!
//! Settings for the voting application, read from the process environment
//! once at startup. Any problem here is fatal: the server refuses to start
//! rather than run with a guessed limit or catalog.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Weekday;
use thiserror::Error;

use crate::domain::value_objects::ThrottleConfig;

pub const DEFAULT_SERVICE_NAMESPACE: &str = "http://tempuri.org/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// HMAC key for signing session cookies (32 bytes)
    pub secret: [u8; 32],
    /// Idle lifetime; also the cookie Max-Age
    pub ttl: Duration,
    pub sweep_interval: Duration,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "vgvs_session".to_string(),
            secret: [0u8; 32],
            ttl: Duration::from_secs(1200),
            sweep_interval: Duration::from_secs(60),
            cookie_secure: true,
        }
    }
}

impl SessionConfig {
    /// Random secret and insecure cookie, for local development
    pub fn development() -> Self {
        Self {
            secret: platform::crypto::random_key(),
            cookie_secure: false,
            ..Default::default()
        }
    }
}

/// Remote catalog service settings
#[derive(Debug, Clone)]
pub struct RemoteCatalogConfig {
    pub url: String,
    pub namespace: String,
    pub api_key: String,
    /// Call `CheckKey` before serving
    pub verify_key: bool,
    pub timeout: Duration,
}

/// Which catalog backend serves the games
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    Memory,
    Remote(RemoteCatalogConfig),
}

/// Voting application configuration
#[derive(Debug, Clone)]
pub struct VotingConfig {
    pub throttle: ThrottleConfig,
    pub session: SessionConfig,
    pub catalog: CatalogBackend,
}

impl VotingConfig {
    /// Load from the process environment
    ///
    /// Debug builds fall back to [`SessionConfig::development`] when no
    /// secret is configured; release builds require `SESSION_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), cfg!(debug_assertions))
    }

    /// Load through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F, development: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let max_actions = parse_max_actions(
            get("MAX_ACTIONS_PER_DAY")
                .as_deref()
                .ok_or(ConfigError::Missing("MAX_ACTIONS_PER_DAY"))?,
        )?;
        let blackout_days = parse_blackout_days(lookup("BLACKOUT_DAYS").as_deref().unwrap_or(""))?;

        let catalog = match get("CATALOG_BACKEND")
            .map(|value| value.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("memory") => CatalogBackend::Memory,
            Some("remote") => CatalogBackend::Remote(RemoteCatalogConfig {
                url: get("CATALOG_SERVICE_URL")
                    .ok_or(ConfigError::Missing("CATALOG_SERVICE_URL"))?
                    .trim()
                    .to_string(),
                namespace: get("CATALOG_SERVICE_NAMESPACE")
                    .map(|ns| ns.trim().to_string())
                    .unwrap_or_else(|| DEFAULT_SERVICE_NAMESPACE.to_string()),
                api_key: get("CATALOG_API_KEY")
                    .ok_or(ConfigError::Missing("CATALOG_API_KEY"))?
                    .trim()
                    .to_string(),
                verify_key: parse_bool("CATALOG_VERIFY_KEY", get("CATALOG_VERIFY_KEY"), false)?,
                timeout: parse_secs("CATALOG_TIMEOUT_SECS", get("CATALOG_TIMEOUT_SECS"), 10)?,
            }),
            Some(other) => {
                return Err(ConfigError::invalid(
                    "CATALOG_BACKEND",
                    format!("unknown backend '{other}' (expected memory or remote)"),
                ));
            }
        };

        let base = match get("SESSION_SECRET") {
            Some(secret) => SessionConfig {
                secret: parse_secret(&secret)?,
                cookie_secure: !development,
                ..Default::default()
            },
            None if development => SessionConfig::development(),
            None => return Err(ConfigError::Missing("SESSION_SECRET")),
        };
        let session = SessionConfig {
            ttl: parse_secs("SESSION_TTL_SECS", get("SESSION_TTL_SECS"), 1200)?,
            sweep_interval: parse_secs(
                "SESSION_SWEEP_INTERVAL_SECS",
                get("SESSION_SWEEP_INTERVAL_SECS"),
                60,
            )?,
            cookie_secure: parse_bool("COOKIE_SECURE", get("COOKIE_SECURE"), base.cookie_secure)?,
            ..base
        };

        Ok(Self {
            throttle: ThrottleConfig::new(max_actions, blackout_days),
            session,
            catalog,
        })
    }
}

/// Daily action cap; must be a positive integer
pub fn parse_max_actions(raw: &str) -> Result<u32, ConfigError> {
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid("MAX_ACTIONS_PER_DAY", format!("{e}")))?;
    if value == 0 {
        return Err(ConfigError::invalid(
            "MAX_ACTIONS_PER_DAY",
            "must be greater than zero",
        ));
    }
    Ok(value)
}

/// Comma-separated full weekday names, case-insensitive
///
/// An empty list is valid and means no blackout days.
pub fn parse_blackout_days(raw: &str) -> Result<HashSet<Weekday>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            parse_weekday(name).ok_or_else(|| {
                ConfigError::invalid("BLACKOUT_DAYS", format!("'{name}' is not a weekday name"))
            })
        })
        .collect()
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let day = match name.to_ascii_lowercase().as_str() {
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn parse_secret(raw: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = platform::crypto::from_base64(raw.trim())
        .map_err(|e| ConfigError::invalid("SESSION_SECRET", format!("not base64: {e}")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        ConfigError::invalid(
            "SESSION_SECRET",
            format!("expected 32 bytes, got {}", bytes.len()),
        )
    })
}

fn parse_secs(
    key: &'static str,
    raw: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(key, "must be greater than zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::invalid(key, format!("{e}"))),
    }
}

fn parse_bool(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::invalid(key, format!("'{other}' is not a boolean"))),
    }
}
