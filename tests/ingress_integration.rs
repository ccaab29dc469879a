//! Integration tests for the ingress loop
//!
//! These run `TickIngress::run` over a channel with several interleaved
//! symbols and check per-symbol ordering, isolation and the final stats.

mod common;

use async_trait::async_trait;
use futures_util::future::join_all;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::time::timeout;

use common::{drain, harness};
use grid_checkpoint::common::channels::{create_tick_channel, create_trade_channel};
use grid_checkpoint::config::EngineConfig;
use grid_checkpoint::{
    CheckpointStore, Checkpoint, InMemoryStore, PriceTick, SequentialNonce, Side, TickIngress,
    TickProcessor, TradeInstruction, TradeSink,
};

/// Sink that blocks trades for one symbol until released
struct StallingSink {
    stalled: &'static str,
    release: Arc<Notify>,
    trades: mpsc::Sender<TradeInstruction>,
}

#[async_trait]
impl TradeSink for StallingSink {
    async fn emit(&self, instruction: &TradeInstruction) -> grid_checkpoint::Result<()> {
        if instruction.symbol == self.stalled {
            self.release.notified().await;
        }
        self.trades
            .send(instruction.clone())
            .await
            .map_err(|e| grid_checkpoint::EngineError::Sink(e.to_string()))
    }
}

#[tokio::test]
async fn test_run_keeps_per_symbol_order() {
    let mut h = harness(&[
        ("EURUSD", Checkpoint::positioned(12, Side::Buy)),
        ("GBPUSD", Checkpoint::positioned(20, Side::Sell)),
    ]);
    let (tx, rx) = create_tick_channel();

    let feed = [
        r#"{"symbol":"EURUSD","bid":9,"ask":9.1}"#,     // EURUSD reverse to SELL at 9
        r#"{"symbol":"GBPUSD","bid":21.5,"ask":21.6}"#, // GBPUSD reverse to BUY at 21.6
        r#"{"symbol":"EURUSD","bid":10.2,"ask":10.3}"#, // EURUSD reverse to BUY at 10.3
        r#"{"bid":"abc"}"#,                             // discarded
        r#"{"symbol":"GBPUSD","bid":20.4,"ask":20.5}"#, // GBPUSD reverse to SELL at 20.4
        r#"{"symbol":"EURUSD","bid":9.7,"ask":9.8}"#,   // EURUSD reverse to SELL at 9.7
    ];
    for raw in feed {
        tx.send(raw.to_string()).await.unwrap();
    }
    drop(tx);

    let stats = TickIngress::new(h.processor.clone()).run(rx).await;

    assert_eq!(stats.received, 6);
    assert_eq!(stats.discarded, 1);
    assert_eq!(stats.processed, 5);
    assert_eq!(stats.trades, 5);
    assert_eq!(stats.failed, 0);

    let trades = drain(&mut h.trades);
    let eurusd: Vec<(Side, rust_decimal::Decimal)> = trades
        .iter()
        .filter(|t| t.symbol == "EURUSD")
        .map(|t| (t.action, t.price))
        .collect();
    let gbpusd: Vec<(Side, rust_decimal::Decimal)> = trades
        .iter()
        .filter(|t| t.symbol == "GBPUSD")
        .map(|t| (t.action, t.price))
        .collect();

    assert_eq!(
        eurusd,
        vec![(Side::Sell, dec!(9)), (Side::Buy, dec!(10.3)), (Side::Sell, dec!(9.7))]
    );
    assert_eq!(gbpusd, vec![(Side::Buy, dec!(21.6)), (Side::Sell, dec!(20.4))]);

    assert_eq!(
        h.store.get_checkpoint("EURUSD").await.unwrap(),
        Some(Checkpoint::positioned(9, Side::Sell))
    );
    assert_eq!(
        h.store.get_checkpoint("GBPUSD").await.unwrap(),
        Some(Checkpoint::positioned(20, Side::Sell))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_ticks_trade_once() {
    let mut h = harness(&[("EURUSD", Checkpoint::positioned(12, Side::Buy))]);

    // The same reversal tick raced from many tasks must only reverse once
    let tasks = (0..16).map(|_| {
        let processor = Arc::clone(&h.processor);
        tokio::spawn(async move {
            processor
                .process(PriceTick::new("EURUSD", dec!(9)).with_ask(dec!(9.1)))
                .await
        })
    });

    let results = join_all(tasks).await;
    let reversals = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .filter(|outcome| outcome.trade.is_some())
        .count();

    assert_eq!(reversals, 1);
    assert_eq!(drain(&mut h.trades).len(), 1);
    assert_eq!(
        h.store.get_checkpoint("EURUSD").await.unwrap(),
        Some(Checkpoint::positioned(9, Side::Sell))
    );
}

#[tokio::test]
async fn test_stalled_symbol_does_not_block_others() {
    let store = Arc::new(
        InMemoryStore::new()
            .with_checkpoint("SLOW", Checkpoint::positioned(12, Side::Buy))
            .with_checkpoint("FAST", Checkpoint::positioned(12, Side::Buy)),
    );
    let release = Arc::new(Notify::new());
    let (trade_tx, mut trade_rx) = create_trade_channel();
    let processor = Arc::new(TickProcessor::new(
        EngineConfig::default(),
        store.clone(),
        Arc::new(StallingSink {
            stalled: "SLOW",
            release: release.clone(),
            trades: trade_tx,
        }),
        Arc::new(SequentialNonce::new("stall")),
    ));

    let (tx, rx) = create_tick_channel();
    let run = tokio::spawn(TickIngress::with_queue_size(processor, 1).run(rx));

    for _ in 0..3 {
        tx.send(r#"{"symbol":"SLOW","bid":9,"ask":9.1}"#.to_string()).await.unwrap();
    }
    tx.send(r#"{"symbol":"FAST","bid":9,"ask":9.1}"#.to_string()).await.unwrap();

    let fast = timeout(Duration::from_secs(2), trade_rx.recv())
        .await
        .expect("FAST trade held up behind SLOW")
        .unwrap();
    assert_eq!(fast.symbol, "FAST");
    assert_eq!(
        store.get_checkpoint("FAST").await.unwrap(),
        Some(Checkpoint::positioned(9, Side::Sell))
    );

    release.notify_one();
    drop(tx);
    let stats = timeout(Duration::from_secs(5), run).await.unwrap().unwrap();

    assert_eq!(stats.received, 4);
    assert_eq!(stats.trades, 2);
    assert!(stats.dropped >= 1);
    assert_eq!(stats.processed + stats.dropped, 4);
    assert_eq!(
        store.get_checkpoint("SLOW").await.unwrap(),
        Some(Checkpoint::positioned(9, Side::Sell))
    );
}
