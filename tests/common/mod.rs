//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;
use tokio::sync::mpsc;

use grid_checkpoint::common::channels::create_trade_channel;
use grid_checkpoint::config::EngineConfig;
use grid_checkpoint::{
    ChannelTradeSink, Checkpoint, InMemoryStore, SequentialNonce, TickProcessor, TradeInstruction,
};

/// Processor wired to an in-memory store and a channel sink
pub struct Harness {
    pub processor: Arc<TickProcessor>,
    pub store: Arc<InMemoryStore>,
    pub trades: mpsc::Receiver<TradeInstruction>,
}

/// Build a harness with default engine settings and the given seed state
pub fn harness(seed: &[(&str, Checkpoint)]) -> Harness {
    harness_with(EngineConfig::default(), seed)
}

pub fn harness_with(engine: EngineConfig, seed: &[(&str, Checkpoint)]) -> Harness {
    let store = seed
        .iter()
        .fold(InMemoryStore::new(), |store, (symbol, cp)| store.with_checkpoint(*symbol, *cp));
    let store = Arc::new(store);
    let (tx, rx) = create_trade_channel();

    let processor = Arc::new(TickProcessor::new(
        engine,
        store.clone(),
        Arc::new(ChannelTradeSink::new(tx)),
        Arc::new(SequentialNonce::new("test")),
    ));

    Harness {
        processor,
        store,
        trades: rx,
    }
}

/// Drain every trade currently buffered on the channel
pub fn drain(trades: &mut mpsc::Receiver<TradeInstruction>) -> Vec<TradeInstruction> {
    let mut out = Vec::new();
    while let Ok(trade) = trades.try_recv() {
        out.push(trade);
    }
    out
}

/// Sample raw tick messages
pub mod ticks {
    pub const EURUSD_BOOTSTRAP: &str = r#"{"symbol":"EURUSD","bid":1.2345,"ask":1.2347}"#;
    pub const EURUSD_INITIAL_BUY: &str = r#"{"symbol":"EURUSD","bid":1.5,"ask":1.52}"#;
    pub const MALFORMED_BID: &str = r#"{"bid":"abc"}"#;
    pub const STRING_BID: &str = r#"{"symbol":"EURUSD","bid":"abc"}"#;
}
