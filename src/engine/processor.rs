//! Per-symbol serialized tick processing
//!
//! ```text
//! lock(symbol)
//!   ├─ ConfigResolver::resolve      (store read)
//!   ├─ CheckpointStore::get         (store read)
//!   ├─ CheckpointStateMachine       (pure)
//!   ├─ commit tick overrides        (only once the tick is accepted)
//!   ├─ CheckpointStore::set         (store write, before any emit)
//!   ├─ SymbolConfig reset           (initial trade only)
//!   └─ TradeSink::emit              (still under the lock, keeps order)
//! unlock(symbol)
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use super::resolver::ConfigResolver;
use crate::common::errors::Result;
use crate::common::traits::{CheckpointStore, NonceGenerator, TradeSink};
use crate::common::types::{Checkpoint, PriceTick, TradeInstruction};
use crate::config::EngineConfig;
use crate::strategy::{generate_range, CheckpointStateMachine, PlannedTrade, ResolvedConfig, Transition};

/// Result of processing one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub symbol: String,
    pub transition: Transition,
    /// Instruction handed to the sink, if the transition traded
    pub trade: Option<TradeInstruction>,
}

/// Runs the read → decide → write → emit sequence for each tick
///
/// Ticks for the same symbol are serialized by a per-symbol async mutex;
/// ticks for different symbols run concurrently.
pub struct TickProcessor {
    machine: CheckpointStateMachine,
    resolver: ConfigResolver,
    store: Arc<dyn CheckpointStore>,
    sink: Arc<dyn TradeSink>,
    nonces: Arc<dyn NonceGenerator>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TickProcessor {
    pub fn new(
        engine: EngineConfig,
        store: Arc<dyn CheckpointStore>,
        sink: Arc<dyn TradeSink>,
        nonces: Arc<dyn NonceGenerator>,
    ) -> Self {
        Self {
            machine: CheckpointStateMachine::new(engine.range_width),
            resolver: ConfigResolver::new(engine),
            store,
            sink,
            nonces,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Process a decoded tick
    ///
    /// On any error the stored checkpoint is left as it was before the
    /// failing write and no trade is emitted.
    #[instrument(skip(self, tick), fields(symbol = %tick.symbol, bid = %tick.bid))]
    pub async fn process(&self, tick: PriceTick) -> Result<TickOutcome> {
        let symbol_lock = self.symbol_lock(&tick.symbol).await;
        let _guard = symbol_lock.lock().await;

        let resolved = self.resolver.resolve(self.store.as_ref(), &tick).await?;
        let prior = self.store.get_checkpoint(&tick.symbol).await?;
        let transition = self.machine.decide(prior.as_ref(), &tick, &resolved)?;
        self.resolver.commit_overrides(&tick).await;

        if let Some(checkpoint) = transition.checkpoint() {
            self.store.set_checkpoint(&tick.symbol, checkpoint).await?;
            self.log_transition(&tick, &transition, checkpoint, &resolved);
        } else {
            debug!(current = ?prior.map(|cp| cp.current), "No checkpoint change");
        }

        if transition.resets_eclipse_buffer() {
            self.resolver.clear_eclipse_buffer(&tick.symbol).await;
            self.store
                .set_symbol_config(ConfigResolver::initial_trade_config(&tick.symbol, &resolved))
                .await?;
        }

        let trade = match (transition.trade(), transition.checkpoint()) {
            (Some(planned), Some(checkpoint)) => {
                let instruction = self.instruction(&tick.symbol, planned, checkpoint, &transition, &resolved);
                if let Err(e) = self.sink.emit(&instruction).await {
                    error!(nonce = %instruction.nonce, "Failed to emit trade: {}", e);
                    return Err(e);
                }
                info!(
                    action = %instruction.action,
                    price = %instruction.price,
                    checkpoint = instruction.checkpoint,
                    nonce = %instruction.nonce,
                    latency_ms = tick.age().num_milliseconds(),
                    "Trade emitted"
                );
                Some(instruction)
            }
            _ => None,
        };

        Ok(TickOutcome {
            symbol: tick.symbol,
            transition,
            trade,
        })
    }

    async fn symbol_lock(&self, symbol: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(symbol.to_string()).or_default().clone()
    }

    fn instruction(
        &self,
        symbol: &str,
        planned: PlannedTrade,
        checkpoint: Checkpoint,
        transition: &Transition,
        resolved: &ResolvedConfig,
    ) -> TradeInstruction {
        let eclipse_buffer = if transition.resets_eclipse_buffer() {
            rust_decimal::Decimal::ZERO
        } else {
            resolved.eclipse_buffer
        };

        TradeInstruction {
            kind: TradeInstruction::KIND.to_string(),
            symbol: symbol.to_string(),
            action: planned.side,
            price: planned.price,
            gap: resolved.gap,
            eclipse_buffer,
            checkpoint: checkpoint.current,
            initial_traded: checkpoint.initial_traded,
            prior_direction: planned.prior_direction,
            volume: resolved.volume,
            nonce: self.nonces.next_nonce(),
        }
    }

    fn log_transition(
        &self,
        tick: &PriceTick,
        transition: &Transition,
        checkpoint: Checkpoint,
        resolved: &ResolvedConfig,
    ) {
        let neighbours = generate_range(checkpoint.current.into(), resolved.gap, 1).ok();
        let prev = neighbours.as_ref().and_then(|r| r.prev());
        let next = neighbours.as_ref().and_then(|r| r.next());

        match transition {
            Transition::Initialize { .. } => {
                info!(current = checkpoint.current, "Checkpoint created");
            }
            Transition::Advance { .. } => {
                info!(
                    current = checkpoint.current,
                    direction = %checkpoint.direction,
                    prev = ?prev,
                    next = ?next,
                    "Checkpoint advanced, skipping re-entry"
                );
            }
            _ => {
                info!(
                    transition = transition.label(),
                    price = %tick.bid,
                    current = checkpoint.current,
                    direction = %checkpoint.direction,
                    prev = ?prev,
                    next = ?next,
                    "Checkpoint updated"
                );
            }
        }
    }
}
