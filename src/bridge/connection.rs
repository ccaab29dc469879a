//! TCP connection to the execution bridge

use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::messages::{BridgeCommand, InboundLine};
use crate::common::errors::{EngineError, Result};

/// Shared write half of the bridge socket
///
/// Cloned into the trade sink; swapped out on reconnect. Writes fail with
/// a sink error while no socket is attached.
#[derive(Clone, Default)]
pub struct BridgeWriter {
    inner: Arc<Mutex<Option<OwnedWriteHalf>>>,
}

impl BridgeWriter {
    pub async fn attach(&self, half: OwnedWriteHalf) {
        *self.inner.lock().await = Some(half);
    }

    pub async fn detach(&self) {
        *self.inner.lock().await = None;
    }

    pub async fn is_attached(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    /// Write one value as a JSON line
    pub async fn send_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');

        let mut guard = self.inner.lock().await;
        let half = guard
            .as_mut()
            .ok_or_else(|| EngineError::Sink("bridge not connected".to_string()))?;

        if let Err(e) = half.write_all(&line).await {
            *guard = None;
            return Err(EngineError::BridgeIo(e));
        }
        debug!("Sent to bridge: {}", String::from_utf8_lossy(&line).trim_end());
        Ok(())
    }
}

/// Connection to the bridge server
///
/// The bridge streams ticks to us and accepts subscription commands and
/// trade instructions on the same socket.
pub struct BridgeConnection {
    address: String,
    writer: BridgeWriter,
}

impl BridgeConnection {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            writer: BridgeWriter::default(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Writer handle for building a trade sink
    pub fn writer(&self) -> BridgeWriter {
        self.writer.clone()
    }

    /// Connect and spawn the reader task
    ///
    /// Tick lines are forwarded to `ticks`. The returned handle finishes
    /// when the bridge closes the socket or the tick channel is dropped.
    #[instrument(skip(self, ticks), fields(address = %self.address))]
    pub async fn connect(&self, ticks: mpsc::Sender<String>) -> Result<JoinHandle<()>> {
        info!("Connecting to bridge");
        let stream = TcpStream::connect(&self.address).await?;
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        self.writer.attach(write_half).await;
        info!("Bridge connection established");

        let writer = self.writer.clone();
        Ok(tokio::spawn(read_loop(read_half, ticks, writer)))
    }

    /// Ask the bridge to stream ticks for these symbols
    #[instrument(skip(self))]
    pub async fn subscribe(&self, symbols: &[String]) -> Result<()> {
        for symbol in symbols {
            self.writer.send_json(&BridgeCommand::subscribe(symbol.as_str())).await?;
        }
        info!("Subscribed to {} symbols", symbols.len());
        Ok(())
    }

    /// Stop the tick stream for these symbols
    #[instrument(skip(self))]
    pub async fn unsubscribe(&self, symbols: &[String]) -> Result<()> {
        for symbol in symbols {
            self.writer.send_json(&BridgeCommand::unsubscribe(symbol.as_str())).await?;
        }
        info!("Unsubscribed from {} symbols", symbols.len());
        Ok(())
    }

    /// Drop the write half; the bridge sees the socket close
    pub async fn disconnect(&self) {
        self.writer.detach().await;
        info!("Disconnected from bridge");
    }
}

async fn read_loop(read_half: OwnedReadHalf, ticks: mpsc::Sender<String>, writer: BridgeWriter) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match InboundLine::classify(&line) {
                InboundLine::Empty => {}
                InboundLine::Ack(ack) => {
                    debug!(status = %ack.status, symbol = %ack.symbol, action = %ack.action, "Bridge ack");
                }
                InboundLine::Tick(raw) => {
                    if ticks.send(raw).await.is_err() {
                        warn!("Tick channel closed, stopping bridge reader");
                        break;
                    }
                }
            },
            Ok(None) => {
                info!("Bridge closed the connection");
                break;
            }
            Err(e) => {
                error!("Bridge read error: {}", e);
                break;
            }
        }
    }

    writer.detach().await;
}
