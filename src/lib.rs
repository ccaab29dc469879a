//! GridCheckpoint Library
//!
//! A streaming decision engine for a grid trading strategy: bid/ask ticks
//! come in, per-symbol checkpoints are advanced or reversed, and trade
//! instructions go out to an execution bridge.

pub mod bridge;
pub mod common;
pub mod config;
pub mod engine;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{EngineError, Result};
pub use common::traits::{CheckpointStore, NonceGenerator, TradeSink};
pub use common::types::{Checkpoint, Direction, PriceTick, Side, SymbolConfig, TradeInstruction};
pub use config::types::AppConfig;

pub use bridge::{BridgeConnection, BridgeTradeSink};
pub use engine::{
    decode_tick, ChannelTradeSink, ConfigResolver, InMemoryStore, IngressStats, SequentialNonce,
    TickIngress, TickOutcome, TickProcessor, UuidNonce,
};

// Strategy types
pub use strategy::{
    generate_range, locate, CheckpointState, CheckpointStateMachine, GridError, GridRange,
    LocatedLevel, PlannedTrade, ResolvedConfig, Transition,
};
