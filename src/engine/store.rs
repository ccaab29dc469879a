//! In-memory checkpoint store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::common::errors::Result;
use crate::common::traits::CheckpointStore;
use crate::common::types::{Checkpoint, SymbolConfig};

/// Checkpoint store backed by process memory
///
/// State lives as long as the process. Useful for replays, tests and
/// single-process deployments where the bridge is the only consumer.
#[derive(Default)]
pub struct InMemoryStore {
    checkpoints: RwLock<HashMap<String, Checkpoint>>,
    configs: RwLock<HashMap<String, SymbolConfig>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a checkpoint before processing starts
    pub fn with_checkpoint(mut self, symbol: impl Into<String>, checkpoint: Checkpoint) -> Self {
        self.checkpoints.get_mut().insert(symbol.into(), checkpoint);
        self
    }

    /// Seed a symbol configuration before processing starts
    pub fn with_symbol_config(mut self, config: SymbolConfig) -> Self {
        self.configs.get_mut().insert(config.symbol.clone(), config);
        self
    }

    /// Number of symbols with a checkpoint
    pub async fn len(&self) -> usize {
        self.checkpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.checkpoints.read().await.is_empty()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryStore {
    async fn get_checkpoint(&self, symbol: &str) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.read().await.get(symbol).copied())
    }

    async fn set_checkpoint(&self, symbol: &str, checkpoint: Checkpoint) -> Result<()> {
        self.checkpoints
            .write()
            .await
            .insert(symbol.to_string(), checkpoint);
        Ok(())
    }

    async fn get_symbol_config(&self, symbol: &str) -> Result<Option<SymbolConfig>> {
        Ok(self.configs.read().await.get(symbol).cloned())
    }

    async fn set_symbol_config(&self, config: SymbolConfig) -> Result<()> {
        self.configs
            .write()
            .await
            .insert(config.symbol.clone(), config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Side;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_missing_records_are_none() {
        let store = InMemoryStore::new();
        assert!(store.get_checkpoint("EURUSD").await.unwrap().is_none());
        assert!(store.get_symbol_config("EURUSD").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = InMemoryStore::new().with_symbol_config(SymbolConfig {
            symbol: "EURUSD".to_string(),
            gap: dec!(2),
            eclipse_buffer: dec!(0.3),
            volume: dec!(0.1),
        });

        store
            .set_checkpoint("EURUSD", Checkpoint::positioned(12, Side::Buy))
            .await
            .unwrap();

        assert_eq!(
            store.get_checkpoint("EURUSD").await.unwrap(),
            Some(Checkpoint::positioned(12, Side::Buy))
        );
        assert_eq!(store.get_symbol_config("EURUSD").await.unwrap().unwrap().gap, dec!(2));
        assert_eq!(store.len().await, 1);
    }
}
