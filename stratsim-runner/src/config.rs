//! Serializable backtest configuration.

use serde::{Deserialize, Serialize};
use stratsim_core::engine::EngineConfig;
use thiserror::Error;

/// Serializable configuration for a single backtest run.
///
/// Captures every parameter needed to reproduce a run: the symbol, the
/// starting capital, the risk knobs, and the crossover windows. Loadable
/// from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    pub symbol: String,

    /// Starting cash balance.
    pub initial_cash: f64,

    /// Fraction of cash risked per entry, in (0, 1].
    pub risk_percent: f64,

    /// Protective stop distance as a fraction of the entry price, in (0, 1).
    pub stop_loss_percent: f64,

    /// Short SMA window in bars.
    pub short_window: usize,

    /// Long SMA window in bars; must exceed the short window.
    pub long_window: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            initial_cash: 100_000.0,
            risk_percent: 0.01,
            stop_loss_percent: 0.05,
            short_window: 50,
            long_window: 200,
        }
    }
}

/// Configuration rejected before any engine is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("initial_cash must be positive and finite, got {0}")]
    InvalidCash(f64),

    #[error("{field} must be in ({low}, {high}), got {value}")]
    RatioOutOfRange {
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error("long_window ({long}) must exceed short_window ({short}), both non-zero")]
    WindowOrder { short: usize, long: usize },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if !(self.initial_cash > 0.0) || !self.initial_cash.is_finite() {
            return Err(ConfigError::InvalidCash(self.initial_cash));
        }
        if !(self.risk_percent > 0.0 && self.risk_percent <= 1.0) {
            return Err(ConfigError::RatioOutOfRange {
                field: "risk_percent",
                value: self.risk_percent,
                low: 0.0,
                high: 1.0,
            });
        }
        if !(self.stop_loss_percent > 0.0 && self.stop_loss_percent < 1.0) {
            return Err(ConfigError::RatioOutOfRange {
                field: "stop_loss_percent",
                value: self.stop_loss_percent,
                low: 0.0,
                high: 1.0,
            });
        }
        if self.short_window == 0 || self.long_window <= self.short_window {
            return Err(ConfigError::WindowOrder {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }

    /// Lower this configuration to the engine's parameter struct.
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::new(self.symbol.clone(), self.initial_cash);
        config.risk_percent = self.risk_percent;
        config.stop_loss_percent = self.stop_loss_percent;
        config
    }
}
