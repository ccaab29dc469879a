use rust_decimal::Decimal;

use crate::common::types::{Checkpoint, Direction, Side};

/// Configuration resolved for one symbol for the duration of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Always positive once resolved
    pub gap: Decimal,
    pub eclipse_buffer: Decimal,
    pub volume: Decimal,
}

/// Where a symbol sits in the checkpoint lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointState {
    /// No checkpoint stored yet
    Uninitialized,
    /// Checkpoint stored, initial trade not fired
    AwaitingInitialEntry,
    /// Holding a position
    Positioned(Side),
    /// Stored record claims a trade happened but carries no direction
    Inconsistent,
}

impl CheckpointState {
    pub fn of(checkpoint: Option<&Checkpoint>) -> Self {
        match checkpoint {
            None => Self::Uninitialized,
            Some(cp) if !cp.initial_traded => Self::AwaitingInitialEntry,
            Some(cp) => match Side::from_direction(cp.direction) {
                Some(side) => Self::Positioned(side),
                None => Self::Inconsistent,
            },
        }
    }
}

/// A trade the state machine wants emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedTrade {
    pub side: Side,
    pub price: Decimal,
    /// Direction held before the trade
    pub prior_direction: Direction,
}

/// Outcome of feeding one tick to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changes
    Hold,
    /// First tick for the symbol; checkpoint created, no trade
    Initialize { checkpoint: Checkpoint },
    /// Eclipse buffer crossed; first trade fires and the buffer resets
    InitialEntry { checkpoint: Checkpoint, trade: PlannedTrade },
    /// Favourable move; checkpoint walks forward without re-entering
    Advance { checkpoint: Checkpoint },
    /// Price crossed back through the checkpoint; direction flips
    Reverse { checkpoint: Checkpoint, trade: PlannedTrade },
}

impl Transition {
    /// Checkpoint to persist, if this transition changes state
    pub fn checkpoint(&self) -> Option<Checkpoint> {
        match self {
            Transition::Hold => None,
            Transition::Initialize { checkpoint }
            | Transition::InitialEntry { checkpoint, .. }
            | Transition::Advance { checkpoint }
            | Transition::Reverse { checkpoint, .. } => Some(*checkpoint),
        }
    }

    /// Trade to emit, if any
    pub fn trade(&self) -> Option<PlannedTrade> {
        match self {
            Transition::InitialEntry { trade, .. } | Transition::Reverse { trade, .. } => Some(*trade),
            _ => None,
        }
    }

    /// Whether the symbol's eclipse buffer must be reset to zero
    pub fn resets_eclipse_buffer(&self) -> bool {
        matches!(self, Transition::InitialEntry { .. })
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Transition::Hold)
    }

    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Transition::Hold => "hold",
            Transition::Initialize { .. } => "initialize",
            Transition::InitialEntry { .. } => "initial_entry",
            Transition::Advance { .. } => "advance",
            Transition::Reverse { .. } => "reverse",
        }
    }
}
