//! Tick processing engine
//!
//! Glue between the pure strategy and the outside world: configuration
//! resolution, per-symbol serialization, persistence and trade emission.
//!
//! ```text
//! raw message ─▶ TickIngress ─▶ per-symbol worker ─▶ TickProcessor
//!                                                      │
//!                          ConfigResolver ◀────────────┤
//!                          CheckpointStore ◀───────────┤
//!                          TradeSink ◀─────────────────┘
//! ```

pub mod ingress;
pub mod processor;
pub mod resolver;
pub mod sink;
pub mod store;

pub use ingress::{decode_tick, IngressStats, TickIngress};
pub use processor::{TickOutcome, TickProcessor};
pub use resolver::ConfigResolver;
pub use sink::{ChannelTradeSink, SequentialNonce, UuidNonce};
pub use store::InMemoryStore;
