use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::errors::SafetyError;

const CONFIG_FILE: &str = "tradeguard";
const ENV_PREFIX: &str = "TRADEGUARD";

/// Safety thresholds for trading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyThresholds {
    pub max_price_change_percent: f64,
    pub max_slippage_percent: f64,
    pub min_liquidity: f64,
    pub max_trade_size_sol: f64,
    pub circuit_breaker_timeout_ms: u64,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            max_price_change_percent: 5.0,        // Above this: volatile, above 2x: extreme
            max_slippage_percent: 1.5,
            min_liquidity: 10_000.0,
            max_trade_size_sol: 10.0,
            circuit_breaker_timeout_ms: 15 * 60 * 1000, // 15 minutes
        }
    }
}

impl SafetyThresholds {
    pub fn circuit_breaker_timeout(&self) -> Duration {
        Duration::from_millis(self.circuit_breaker_timeout_ms)
    }
}

/// Whether `execute_trade` checks the safety gates itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionGate {
    /// Predicates are exposed to callers but execution never consults them
    #[default]
    Advisory,
    /// Refuse execution while tripped, oversized, or slipping past the limit
    Enforced,
}

/// Session-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub thresholds: SafetyThresholds,
    pub price_poll_interval_secs: u64,
    pub condition_check_interval_secs: u64,
    pub fee_rate: f64,
    pub slippage_bps: u16,
    pub warning_log_capacity: usize,
    pub price_history_len: usize,
    pub event_capacity: usize,
    pub execution_gate: ExecutionGate,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            thresholds: SafetyThresholds::default(),
            price_poll_interval_secs: 10,
            condition_check_interval_secs: 60,
            fee_rate: 0.02,
            slippage_bps: 50,
            warning_log_capacity: 1000,
            price_history_len: 200,
            event_capacity: 256,
            execution_gate: ExecutionGate::Advisory,
        }
    }
}

impl SessionConfig {
    /// Load configuration from `tradeguard.toml` (optional) and `TRADEGUARD__*` env vars
    ///
    /// Nested keys use `__`, e.g. `TRADEGUARD__THRESHOLDS__MAX_TRADE_SIZE_SOL=5`.
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
        let config: SessionConfig = settings
            .try_deserialize()
            .context("Failed to deserialize session configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SafetyError> {
        let t = &self.thresholds;
        if t.max_price_change_percent <= 0.0 {
            return Err(SafetyError::Config(
                "max_price_change_percent must be positive".into(),
            ));
        }
        if t.max_slippage_percent < 0.0 {
            return Err(SafetyError::Config(
                "max_slippage_percent must not be negative".into(),
            ));
        }
        if t.max_trade_size_sol <= 0.0 {
            return Err(SafetyError::Config("max_trade_size_sol must be positive".into()));
        }
        if t.circuit_breaker_timeout_ms == 0 {
            return Err(SafetyError::Config(
                "circuit_breaker_timeout_ms must be non-zero".into(),
            ));
        }
        if self.price_poll_interval_secs == 0 || self.condition_check_interval_secs == 0 {
            return Err(SafetyError::Config("polling intervals must be non-zero".into()));
        }
        if self.fee_rate < 0.0 {
            return Err(SafetyError::Config("fee_rate must not be negative".into()));
        }
        if self.event_capacity == 0 {
            return Err(SafetyError::Config("event_capacity must be non-zero".into()));
        }
        Ok(())
    }

    pub fn price_poll_interval(&self) -> Duration {
        Duration::from_secs(self.price_poll_interval_secs)
    }

    pub fn condition_check_interval(&self) -> Duration {
        Duration::from_secs(self.condition_check_interval_secs)
    }
}
