//! Gateway configuration from environment variables.

use std::collections::HashMap;
use thiserror::Error;
use worker_rpc::subjects::DEFAULT_PREFIX;

/// Default audio limit: 50 MiB of raw (decoded) audio.
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 1000;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub http_port: u16,
    pub metrics_port: u16,
    pub nats_url: String,
    pub worker_subject_prefix: String,
    pub limits: GatewayLimits,
}

/// Request limits enforced by the gateway core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayLimits {
    /// Upper bound on decoded audio size.
    pub max_audio_bytes: usize,
    /// Upper bound on concurrent batch size.
    pub max_batch_size: usize,
    /// History entries returned when the caller gives no limit.
    pub default_history_limit: usize,
    /// Largest history limit a caller may ask for.
    pub max_history_limit: usize,
}

impl Default for GatewayLimits {
    fn default() -> Self {
        Self {
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            default_history_limit: DEFAULT_HISTORY_LIMIT,
            max_history_limit: MAX_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

impl GatewayConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::from_kv(&env)
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let http_port = parse_or(kv, "HTTP_PORT", 8080u16)?;
        let metrics_port = parse_or(kv, "METRICS_PORT", 9090u16)?;

        let nats_url = kv
            .get("NATS_URL")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "nats://localhost:4222".to_string());
        if nats_url.is_empty() {
            return Err(ConfigError::Empty("NATS_URL"));
        }

        let worker_subject_prefix = kv
            .get("WORKER_SUBJECT_PREFIX")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if worker_subject_prefix.is_empty() {
            return Err(ConfigError::Empty("WORKER_SUBJECT_PREFIX"));
        }

        let limits = GatewayLimits {
            max_audio_bytes: parse_positive(kv, "MAX_AUDIO_BYTES", DEFAULT_MAX_AUDIO_BYTES)?,
            max_batch_size: parse_positive(kv, "MAX_BATCH_SIZE", DEFAULT_MAX_BATCH_SIZE)?,
            default_history_limit: parse_positive(
                kv,
                "DEFAULT_HISTORY_LIMIT",
                DEFAULT_HISTORY_LIMIT,
            )?
            .min(MAX_HISTORY_LIMIT),
            max_history_limit: MAX_HISTORY_LIMIT,
        };

        Ok(Self {
            http_port,
            metrics_port,
            nats_url,
            worker_subject_prefix,
            limits,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    kv: &HashMap<String, String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match kv.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw.clone(),
        }),
    }
}

fn parse_positive(
    kv: &HashMap<String, String>,
    key: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    let value = parse_or(kv, key, default)?;
    if value == 0 {
        return Err(ConfigError::Zero(key));
    }
    Ok(value)
}
