//! Grid checkpoint strategy
//!
//! Pure decision logic: everything here is synchronous and free of I/O so it
//! can be shared across symbols without locking.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HOT PATH (sync)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PriceTick + prior Checkpoint + ResolvedConfig              │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  generate_range(current, gap, width) → prevs / nexts        │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  locate(floor(bid), prevs, nexts) → level + side            │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  CheckpointStateMachine::decide() → Transition              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`generate_range`]: levels above and below a checkpoint
//! - [`locate`]: nearest relevant level for a price
//! - [`CheckpointStateMachine`]: turns a tick into a [`Transition`]

mod checkpoint;
mod grid;
mod locator;
mod types;

pub use checkpoint::{floor_checkpoint, CheckpointStateMachine};
pub use grid::{generate_range, GridError, GridRange, DEFAULT_RANGE_WIDTH};
pub use locator::{locate, LocatedLevel};
pub use types::{CheckpointState, PlannedTrade, ResolvedConfig, Transition};
