use async_trait::async_trait;
use tracing::instrument;

use super::connection::BridgeWriter;
use crate::common::errors::{EngineError, Result};
use crate::common::traits::TradeSink;
use crate::common::types::TradeInstruction;

/// Trade sink writing instructions to the bridge socket, one JSON line each
#[derive(Clone)]
pub struct BridgeTradeSink {
    writer: BridgeWriter,
}

impl BridgeTradeSink {
    pub fn new(writer: BridgeWriter) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl TradeSink for BridgeTradeSink {
    #[instrument(skip(self, instruction), fields(symbol = %instruction.symbol, nonce = %instruction.nonce))]
    async fn emit(&self, instruction: &TradeInstruction) -> Result<()> {
        self.writer
            .send_json(instruction)
            .await
            .map_err(|e| match e {
                EngineError::Sink(_) => e,
                other => EngineError::Sink(other.to_string()),
            })
    }
}
