//! Checkpoint state machine
//!
//! ```text
//! UNINITIALIZED ──first tick──▶ AWAITING_INITIAL_ENTRY
//!                                   │ |bid - current| >= eclipse buffer
//!                                   ▼
//!                  POSITIONED(BUY) ◀──reverse──▶ POSITIONED(SELL)
//!                  (advance: walk checkpoint, no trade)
//! ```
//!
//! The machine is pure: it reads the prior checkpoint and returns a
//! [`Transition`]. Persisting and emitting are the caller's job.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::grid::{generate_range, DEFAULT_RANGE_WIDTH};
use super::locator::locate;
use super::types::{CheckpointState, PlannedTrade, ResolvedConfig, Transition};
use crate::common::errors::{EngineError, Result};
use crate::common::types::{Checkpoint, Direction, PriceTick, Side};

/// Floor a price to the integer grid
pub fn floor_checkpoint(price: Decimal) -> Result<i64> {
    price
        .floor()
        .to_i64()
        .ok_or_else(|| EngineError::MalformedTick(format!("price {} out of range", price)))
}

/// Decides the next checkpoint and optional trade for a tick
#[derive(Debug, Clone, Copy)]
pub struct CheckpointStateMachine {
    range_width: usize,
}

impl Default for CheckpointStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_RANGE_WIDTH)
    }
}

impl CheckpointStateMachine {
    pub fn new(range_width: usize) -> Self {
        Self { range_width }
    }

    /// Apply one tick to the prior checkpoint
    pub fn decide(
        &self,
        prior: Option<&Checkpoint>,
        tick: &PriceTick,
        config: &ResolvedConfig,
    ) -> Result<Transition> {
        let floored_price = floor_checkpoint(tick.bid)?;

        match (CheckpointState::of(prior), prior) {
            (CheckpointState::Uninitialized, _) => Ok(Transition::Initialize {
                checkpoint: Checkpoint::awaiting(floored_price),
            }),
            (CheckpointState::AwaitingInitialEntry, Some(cp)) => self.initial_entry(cp, tick, config),
            (CheckpointState::Positioned(side), Some(cp)) => {
                self.positioned(cp, side, floored_price, tick, config)
            }
            _ => Ok(Transition::Hold),
        }
    }

    fn initial_entry(
        &self,
        checkpoint: &Checkpoint,
        tick: &PriceTick,
        config: &ResolvedConfig,
    ) -> Result<Transition> {
        let current = Decimal::from(checkpoint.current);
        if (tick.bid - current).abs() < config.eclipse_buffer {
            return Ok(Transition::Hold);
        }

        let side = if tick.bid > current { Side::Buy } else { Side::Sell };
        let price = trade_price(side, tick)?;

        Ok(Transition::InitialEntry {
            checkpoint: Checkpoint::positioned(floor_checkpoint(price)?, side),
            trade: PlannedTrade {
                side,
                price,
                prior_direction: checkpoint.direction,
            },
        })
    }

    fn positioned(
        &self,
        checkpoint: &Checkpoint,
        side: Side,
        floored_price: i64,
        tick: &PriceTick,
        config: &ResolvedConfig,
    ) -> Result<Transition> {
        let current = checkpoint.current;
        let range = generate_range(Decimal::from(current), config.gap, self.range_width)?;

        if let Some(found) = locate(Decimal::from(floored_price), &range.prevs, &range.nexts) {
            if found.direction == side {
                let level = floor_checkpoint(found.level)?;
                let favourable = match side {
                    Side::Buy => level > current,
                    Side::Sell => level < current,
                };
                if favourable {
                    return Ok(Transition::Advance {
                        checkpoint: Checkpoint::positioned(level, side),
                    });
                }
            }
        }

        let crossed_back = match side {
            Side::Buy => floored_price < current,
            Side::Sell => floored_price > current,
        };
        if !crossed_back {
            return Ok(Transition::Hold);
        }

        let reversed = side.reversed();
        Ok(Transition::Reverse {
            checkpoint: Checkpoint::positioned(floored_price, reversed),
            trade: PlannedTrade {
                side: reversed,
                price: trade_price(reversed, tick)?,
                prior_direction: Direction::from(side),
            },
        })
    }
}

/// BUY fills at the ask, SELL at the bid
fn trade_price(side: Side, tick: &PriceTick) -> Result<Decimal> {
    match side {
        Side::Sell => Ok(tick.bid),
        Side::Buy => tick
            .ask
            .filter(|ask| *ask > Decimal::ZERO)
            .ok_or_else(|| EngineError::MalformedTick(format!("{}: BUY trade needs an ask", tick.symbol))),
    }
}
