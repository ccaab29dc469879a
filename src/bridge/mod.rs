//! Execution bridge client - TCP link to the trading terminal

pub mod connection;
pub mod messages;
pub mod sink;

pub use connection::{BridgeConnection, BridgeWriter};
pub use messages::{BridgeAck, BridgeCommand, CommandAction, InboundLine};
pub use sink::BridgeTradeSink;
