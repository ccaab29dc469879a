//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{EngineError, Result};
use crate::strategy::DEFAULT_RANGE_WIDTH;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Grid engine defaults
    #[serde(default)]
    pub engine: EngineConfig,
    /// Execution bridge connection
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Reject defaults that would produce a degenerate grid
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()
    }
}

/// Process-wide grid defaults, used when a symbol has no usable value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Levels generated on each side of the checkpoint
    #[serde(default = "default_range_width")]
    pub range_width: usize,
    /// Fallback grid spacing
    #[serde(default = "default_gap")]
    pub default_gap: Decimal,
    /// Fallback excursion required before the initial trade
    #[serde(default = "default_eclipse_buffer")]
    pub default_eclipse_buffer: Decimal,
    /// Fallback trade size
    #[serde(default = "default_volume")]
    pub default_volume: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            range_width: default_range_width(),
            default_gap: default_gap(),
            default_eclipse_buffer: default_eclipse_buffer(),
            default_volume: default_volume(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.range_width == 0 {
            return Err(EngineError::Configuration(
                "engine.range_width must be at least 1".to_string(),
            ));
        }
        if self.default_gap <= Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "engine.default_gap must be positive, got {}",
                self.default_gap
            )));
        }
        if self.default_eclipse_buffer < Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "engine.default_eclipse_buffer must not be negative, got {}",
                self.default_eclipse_buffer
            )));
        }
        if self.default_volume <= Decimal::ZERO {
            return Err(EngineError::Configuration(format!(
                "engine.default_volume must be positive, got {}",
                self.default_volume
            )));
        }
        Ok(())
    }
}

fn default_range_width() -> usize {
    DEFAULT_RANGE_WIDTH
}

fn default_gap() -> Decimal {
    dec!(2)
}

fn default_eclipse_buffer() -> Decimal {
    dec!(0.30)
}

fn default_volume() -> Decimal {
    dec!(0.1)
}

/// Execution bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// host:port of the bridge TCP server
    #[serde(default = "default_bridge_address")]
    pub address: String,
    /// Delay between reconnection attempts in milliseconds
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Symbols to subscribe to once connected
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: default_bridge_address(),
            reconnect_delay_ms: default_reconnect_delay(),
            symbols: Vec::new(),
        }
    }
}

fn default_bridge_address() -> String {
    "127.0.0.1:5050".to_string()
}

fn default_reconnect_delay() -> u64 {
    5000
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Buffer size of the tick and per-symbol queues
    #[serde(default = "default_channel_size")]
    pub channel_size: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            channel_size: default_channel_size(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_channel_size() -> usize {
    crate::common::channels::DEFAULT_CHANNEL_SIZE
}
