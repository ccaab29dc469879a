//! Channel type definitions for inter-task communication

use tokio::sync::mpsc;

use super::types::TradeInstruction;

/// Default channel buffer size
pub const DEFAULT_CHANNEL_SIZE: usize = 1000;

/// Create a channel carrying raw tick messages with the default buffer size
pub fn create_tick_channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a raw tick channel with a custom buffer size
pub fn create_tick_channel_with_size(size: usize) -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(size)
}

/// Create a trade instruction channel with the default buffer size
pub fn create_trade_channel() -> (
    mpsc::Sender<TradeInstruction>,
    mpsc::Receiver<TradeInstruction>,
) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}
