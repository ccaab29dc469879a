//! In-process trade sinks and nonce generators

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

use crate::common::errors::{EngineError, Result};
use crate::common::traits::{NonceGenerator, TradeSink};
use crate::common::types::TradeInstruction;

/// Forwards trade instructions to a tokio channel
#[derive(Clone)]
pub struct ChannelTradeSink {
    sender: mpsc::Sender<TradeInstruction>,
}

impl ChannelTradeSink {
    pub fn new(sender: mpsc::Sender<TradeInstruction>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl TradeSink for ChannelTradeSink {
    async fn emit(&self, instruction: &TradeInstruction) -> Result<()> {
        self.sender
            .send(instruction.clone())
            .await
            .map_err(|e| EngineError::Sink(format!("trade channel closed: {}", e)))?;
        debug!(symbol = %instruction.symbol, nonce = %instruction.nonce, "Trade queued on channel");
        Ok(())
    }
}

/// Random nonces from UUIDv4
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidNonce;

impl NonceGenerator for UuidNonce {
    fn next_nonce(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic nonces: `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialNonce {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialNonce {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl NonceGenerator for SequentialNonce {
    fn next_nonce(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", self.prefix, n)
    }
}
