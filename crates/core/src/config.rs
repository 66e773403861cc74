// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage engine configuration.
//!
//! Loaded from TOML; every field has a default so a partial file (or no
//! file at all) is valid.
//!
//! ```toml
//! [storage]
//! inline_threshold = 5242880
//! compression = "gzip"
//!
//! [retry]
//! max_attempts = 3
//! base_delay = "100ms"
//!
//! [circuit]
//! failure_threshold = 10
//! recovery_timeout = "60s"
//! ```

use crate::codec::CompressionType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub storage: TierConfig,
    pub retry: RetryConfig,
    pub circuit: CircuitConfig,
    pub monitor: MonitorConfig,
    pub downloads: DownloadLimits,
}

/// Inline vs overflow tier selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// File sets smaller than this are embedded in the session record
    pub inline_threshold: u64,
    /// Algorithm used for overflow payloads
    pub compression: CompressionType,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            inline_threshold: 5 * 1024 * 1024,
            compression: CompressionType::Gzip,
        }
    }
}

/// Retry and backoff settings for storage calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Upper bound on a single document or blob call
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            operation_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Backoff before retrying after `attempt` (1-based) failed:
    /// `base * multiplier^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs)
    }
}

/// Circuit breaker thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    pub failure_threshold: u32,
    #[serde(with = "humantime_serde")]
    pub recovery_timeout: Duration,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 10,
            recovery_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Recent failures kept for inspection
    pub history_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { history_size: 100 }
    }
}

/// Caps on the downloaded-files group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadLimits {
    pub max_files: usize,
    pub max_file_size: u64,
}

impl Default for DownloadLimits {
    fn default() -> Self {
        Self {
            max_files: 50,
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

impl StorageConfig {
    /// Parse and validate a TOML document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: StorageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return Err(ConfigError::Invalid("retry.multiplier must be >= 1.0".into()));
        }
        if self.retry.max_delay < self.retry.base_delay {
            return Err(ConfigError::Invalid(
                "retry.max_delay must not be below retry.base_delay".into(),
            ));
        }
        if self.retry.operation_timeout.is_zero() {
            return Err(ConfigError::Invalid("retry.operation_timeout must be non-zero".into()));
        }
        if self.circuit.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "circuit.failure_threshold must be at least 1".into(),
            ));
        }
        if self.monitor.history_size == 0 {
            return Err(ConfigError::Invalid("monitor.history_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Settings with millisecond delays for tests.
    pub fn for_testing() -> Self {
        Self {
            retry: RetryConfig {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(10),
                multiplier: 2.0,
                operation_timeout: Duration::from_secs(5),
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
