//! Trait definitions for the engine's external collaborators

use async_trait::async_trait;

use super::errors::Result;
use super::types::{Checkpoint, SymbolConfig, TradeInstruction};

/// Durable per-symbol state (checkpoint and symbol configuration)
///
/// A missing record is a valid answer meaning "not initialized yet";
/// implementations only return `Err` when the backing store fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Read the checkpoint for a symbol
    async fn get_checkpoint(&self, symbol: &str) -> Result<Option<Checkpoint>>;

    /// Overwrite the checkpoint for a symbol
    async fn set_checkpoint(&self, symbol: &str, checkpoint: Checkpoint) -> Result<()>;

    /// Read the stored configuration for a symbol
    async fn get_symbol_config(&self, symbol: &str) -> Result<Option<SymbolConfig>>;

    /// Overwrite the stored configuration for a symbol
    async fn set_symbol_config(&self, config: SymbolConfig) -> Result<()>;
}

/// Destination for trade instructions
///
/// Emission is fire-and-forget: `Ok` means the instruction was handed
/// off, not that it was executed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeSink: Send + Sync {
    async fn emit(&self, instruction: &TradeInstruction) -> Result<()>;
}

/// Source of idempotency tokens attached to every trade
pub trait NonceGenerator: Send + Sync {
    fn next_nonce(&self) -> String;
}
