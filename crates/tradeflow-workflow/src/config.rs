//! Workflow configuration.
//!
//! Two switches: whether the access gate enforces caller identity, and how
//! export-document fan-outs are committed. Defaults are safe (gate on,
//! atomic fan-out). Override via environment variables or explicit
//! construction.

use std::str::FromStr;

use crate::access::AccessPolicy;

/// How a command that touches several documents commits its writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanOutPolicy {
    /// Validate every per-kind write first, then commit them as one batch.
    /// A failure leaves every document untouched.
    #[default]
    Atomic,
    /// Apply each kind in order as an independent write. A failure partway
    /// leaves earlier kinds updated.
    Sequential,
}

impl FanOutPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atomic => "atomic",
            Self::Sequential => "sequential",
        }
    }
}

impl std::fmt::Display for FanOutPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanOutPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(Self::Atomic),
            "sequential" => Ok(Self::Sequential),
            _ => Err(ConfigError::InvalidValue {
                var: FANOUT_VAR.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

const ACCESS_CONTROL_VAR: &str = "TRADEFLOW_ACCESS_CONTROL";
const FANOUT_VAR: &str = "TRADEFLOW_FANOUT";

/// Configuration of one [`crate::TradeWorkflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkflowConfig {
    pub access: AccessPolicy,
    pub fan_out: FanOutPolicy,
}

impl WorkflowConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TRADEFLOW_ACCESS_CONTROL`: `on|off|true|false|1|0` (default: on)
    /// - `TRADEFLOW_FANOUT`: `atomic|sequential` (default: atomic)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let access = match lookup(ACCESS_CONTROL_VAR) {
            Some(raw) => AccessPolicy::new(parse_switch(ACCESS_CONTROL_VAR, &raw)?),
            None => AccessPolicy::default(),
        };
        let fan_out = match lookup(FANOUT_VAR) {
            Some(raw) => raw.parse()?,
            None => FanOutPolicy::default(),
        };
        Ok(Self { access, fan_out })
    }
}

fn parse_switch(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}
