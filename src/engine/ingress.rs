//! Tick decoding and the ingress loop

use chrono::Utc;
use futures_util::future::join_all;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::processor::{TickOutcome, TickProcessor};
use crate::common::channels::DEFAULT_CHANNEL_SIZE;
use crate::common::errors::{EngineError, Result};
use crate::common::types::PriceTick;

/// Decode one raw tick message
///
/// `symbol` must be a non-empty string and `bid` a JSON number. `ask` is
/// kept only when numeric. Overrides are read from `gap`/`eclipseBuffer`
/// or the upper-case `GAP`/`ECLIPSE_BUFFER` keys.
pub fn decode_tick(raw: &str) -> Result<PriceTick> {
    let value: Value = serde_json::from_str(raw)?;
    let fields = value
        .as_object()
        .ok_or_else(|| EngineError::MalformedTick("tick is not a JSON object".to_string()))?;

    let symbol = fields
        .get("symbol")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| EngineError::MalformedTick("missing symbol".to_string()))?;

    let bid = fields
        .get("bid")
        .and_then(number)
        .ok_or_else(|| EngineError::MalformedTick(format!("{}: bid is not numeric", symbol)))?;

    Ok(PriceTick {
        symbol: symbol.trim().to_string(),
        bid,
        ask: fields.get("ask").and_then(number),
        gap: first_number(fields, &["gap", "GAP"]),
        eclipse_buffer: first_number(fields, &["eclipseBuffer", "ECLIPSE_BUFFER"]),
        received_at: Utc::now(),
    })
}

fn number(value: &Value) -> Option<Decimal> {
    let Value::Number(n) = value else {
        return None;
    };
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn first_number(fields: &Map<String, Value>, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|key| fields.get(*key).and_then(number))
}

/// Counters reported when the ingress loop finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngressStats {
    /// Raw messages read from the input channel
    pub received: u64,
    /// Messages dropped as malformed
    pub discarded: u64,
    /// Ticks that completed processing
    pub processed: u64,
    /// Trades handed to the sink
    pub trades: u64,
    /// Ticks that failed on store or sink I/O
    pub failed: u64,
    /// Ticks dropped because their symbol's worker queue was full
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    discarded: AtomicU64,
    processed: AtomicU64,
    trades: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> IngressStats {
        IngressStats {
            received: self.received.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            trades: self.trades.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn record(&self, symbol: &str, result: &Result<TickOutcome>) {
        match result {
            Ok(outcome) => {
                self.processed.fetch_add(1, Ordering::Relaxed);
                if outcome.trade.is_some() {
                    self.trades.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(e) if e.is_discardable() => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                warn!(symbol, "Discarded tick: {}", e);
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!(symbol, "Tick processing failed: {}", e);
            }
        }
    }
}

/// Routes raw tick messages to per-symbol workers
///
/// Each symbol gets its own queue and task, so one symbol's ticks are
/// processed in arrival order while different symbols run in parallel.
/// The dispatcher never waits on a worker: a tick for a symbol whose queue
/// is full is dropped and counted.
pub struct TickIngress {
    processor: Arc<TickProcessor>,
    queue_size: usize,
    counters: Arc<Counters>,
}

impl TickIngress {
    pub fn new(processor: Arc<TickProcessor>) -> Self {
        Self::with_queue_size(processor, DEFAULT_CHANNEL_SIZE)
    }

    pub fn with_queue_size(processor: Arc<TickProcessor>, queue_size: usize) -> Self {
        Self {
            processor,
            queue_size: queue_size.max(1),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Decode and process one message inline
    pub async fn handle_message(&self, raw: &str) -> Result<TickOutcome> {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        let tick = match decode_tick(raw) {
            Ok(tick) => tick,
            Err(e) => {
                self.counters.discarded.fetch_add(1, Ordering::Relaxed);
                warn!("Discarded message: {} - {}", e, raw);
                return Err(e);
            }
        };
        let symbol = tick.symbol.clone();
        let result = self.processor.process(tick).await;
        self.counters.record(&symbol, &result);
        result
    }

    /// Consume messages until the channel closes, then drain the workers
    pub async fn run(self, mut receiver: mpsc::Receiver<String>) -> IngressStats {
        let mut workers: HashMap<String, (mpsc::Sender<PriceTick>, JoinHandle<()>)> = HashMap::new();

        while let Some(raw) = receiver.recv().await {
            self.counters.received.fetch_add(1, Ordering::Relaxed);

            let tick = match decode_tick(&raw) {
                Ok(tick) => tick,
                Err(e) => {
                    self.counters.discarded.fetch_add(1, Ordering::Relaxed);
                    warn!("Discarded message: {} - {}", e, raw);
                    continue;
                }
            };

            let symbol = tick.symbol.clone();
            let (queue, _) = workers
                .entry(symbol.clone())
                .or_insert_with(|| self.spawn_worker(&symbol));

            match queue.try_send(tick) {
                Ok(()) => {}
                Err(TrySendError::Full(tick)) => {
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(symbol = %symbol, bid = %tick.bid, "Symbol worker busy, dropping tick");
                }
                Err(TrySendError::Closed(_)) => {
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(symbol = %symbol, "Worker queue closed");
                    workers.remove(&symbol);
                }
            }
        }

        debug!(workers = workers.len(), "Input closed, draining symbol workers");
        let handles: Vec<JoinHandle<()>> = workers.into_values().map(|(_, handle)| handle).collect();
        for joined in join_all(handles).await {
            if let Err(e) = joined {
                error!("Symbol worker panicked: {}", e);
            }
        }

        let stats = self.counters.snapshot();
        info!(
            received = stats.received,
            processed = stats.processed,
            trades = stats.trades,
            discarded = stats.discarded,
            failed = stats.failed,
            dropped = stats.dropped,
            "Tick ingress finished"
        );
        stats
    }

    /// Counters so far
    pub fn stats(&self) -> IngressStats {
        self.counters.snapshot()
    }

    fn spawn_worker(&self, symbol: &str) -> (mpsc::Sender<PriceTick>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<PriceTick>(self.queue_size);
        let processor = self.processor.clone();
        let counters = self.counters.clone();
        let symbol = symbol.to_string();

        debug!(symbol = %symbol, "Starting symbol worker");
        let handle = tokio::spawn(async move {
            while let Some(tick) = rx.recv().await {
                let result = processor.process(tick).await;
                counters.record(&symbol, &result);
            }
        });

        (tx, handle)
    }
}
