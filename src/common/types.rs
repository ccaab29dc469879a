//! Domain types shared by the engine, the store and the bridge

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position bias held for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// No position yet (before the initial trade)
    #[default]
    None,
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::None => write!(f, "NONE"),
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Trade side carried by an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Side implied by a direction; `None` maps to no side
    pub fn from_direction(direction: Direction) -> Option<Self> {
        match direction {
            Direction::Buy => Some(Side::Buy),
            Direction::Sell => Some(Side::Sell),
            Direction::None => None,
        }
    }

    /// The opposite side
    pub fn reversed(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl From<Side> for Direction {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Direction::Buy,
            Side::Sell => Direction::Sell,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Persisted grid reference for one symbol
///
/// `direction` is `None` exactly while `initial_traded` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Integer grid reference price
    pub current: i64,
    /// Bias currently held
    pub direction: Direction,
    /// Whether the bootstrapping trade has fired
    pub initial_traded: bool,
}

impl Checkpoint {
    /// Fresh checkpoint waiting for its initial entry
    pub fn awaiting(current: i64) -> Self {
        Self {
            current,
            direction: Direction::None,
            initial_traded: false,
        }
    }

    /// Checkpoint holding a position in `direction`
    pub fn positioned(current: i64, side: Side) -> Self {
        Self {
            current,
            direction: side.into(),
            initial_traded: true,
        }
    }
}

/// Per-symbol trading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolConfig {
    pub symbol: String,
    /// Spacing between adjacent grid levels
    pub gap: Decimal,
    /// Minimum excursion before the initial trade
    pub eclipse_buffer: Decimal,
    /// Trade size
    pub volume: Decimal,
}

/// A decoded bid/ask update
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTick {
    pub symbol: String,
    pub bid: Decimal,
    /// Only needed when a BUY trade price has to be taken
    pub ask: Option<Decimal>,
    /// Positive gap override for this and later ticks of the symbol
    pub gap: Option<Decimal>,
    /// Positive eclipse buffer override for this and later ticks of the symbol
    pub eclipse_buffer: Option<Decimal>,
    pub received_at: DateTime<Utc>,
}

impl PriceTick {
    pub fn new(symbol: impl Into<String>, bid: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            bid,
            ask: None,
            gap: None,
            eclipse_buffer: None,
            received_at: Utc::now(),
        }
    }

    /// Time since the tick was decoded
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.received_at)
    }

    pub fn with_ask(mut self, ask: Decimal) -> Self {
        self.ask = Some(ask);
        self
    }

    pub fn with_gap(mut self, gap: Decimal) -> Self {
        self.gap = Some(gap);
        self
    }

    pub fn with_eclipse_buffer(mut self, eclipse_buffer: Decimal) -> Self {
        self.eclipse_buffer = Some(eclipse_buffer);
        self
    }
}

/// Instruction forwarded to the execution venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInstruction {
    /// Always `"trade"` on the wire
    #[serde(rename = "type", default = "trade_kind")]
    pub kind: String,
    pub symbol: String,
    pub action: Side,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gap: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub eclipse_buffer: Decimal,
    /// Checkpoint persisted by the transition that produced this trade
    pub checkpoint: i64,
    pub initial_traded: bool,
    /// Direction held before this trade
    pub prior_direction: Direction,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    pub nonce: String,
}

fn trade_kind() -> String {
    "trade".to_string()
}

impl TradeInstruction {
    pub const KIND: &'static str = "trade";
}
