//! Per-symbol configuration resolution

use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::common::errors::Result;
use crate::common::traits::CheckpointStore;
use crate::common::types::{PriceTick, SymbolConfig};
use crate::config::EngineConfig;
use crate::strategy::ResolvedConfig;

/// Overrides carried in by ticks, remembered per symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SymbolOverride {
    gap: Option<Decimal>,
    eclipse_buffer: Option<Decimal>,
}

/// Resolves gap, eclipse buffer and volume for a symbol
///
/// Precedence: latest positive tick override, then the stored symbol
/// configuration, then the engine defaults. A stored gap that is not
/// positive is ignored rather than handed to the grid.
pub struct ConfigResolver {
    defaults: EngineConfig,
    overrides: RwLock<HashMap<String, SymbolOverride>>,
}

impl ConfigResolver {
    pub fn new(defaults: EngineConfig) -> Self {
        Self {
            defaults,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the configuration for the tick's symbol
    ///
    /// Positive overrides on the tick apply to this tick only until
    /// [`commit_overrides`](Self::commit_overrides) makes them stick.
    pub async fn resolve(&self, store: &dyn CheckpointStore, tick: &PriceTick) -> Result<ResolvedConfig> {
        let current = self.merged_overrides(tick).await;
        let stored = store.get_symbol_config(&tick.symbol).await?;

        let stored_gap = match stored.as_ref().map(|c| c.gap) {
            Some(gap) if gap > Decimal::ZERO => Some(gap),
            Some(gap) => {
                warn!(symbol = %tick.symbol, gap = %gap, "Stored gap is not positive, ignoring it");
                None
            }
            None => None,
        };
        let gap = current
            .gap
            .or(stored_gap)
            .unwrap_or(self.defaults.default_gap);

        let eclipse_buffer = current
            .eclipse_buffer
            .or_else(|| {
                stored
                    .as_ref()
                    .map(|c| c.eclipse_buffer)
                    .filter(|buffer| *buffer >= Decimal::ZERO)
            })
            .unwrap_or(self.defaults.default_eclipse_buffer);

        let volume = stored
            .as_ref()
            .map(|c| c.volume)
            .filter(|volume| *volume > Decimal::ZERO)
            .unwrap_or(self.defaults.default_volume);

        Ok(ResolvedConfig {
            gap,
            eclipse_buffer,
            volume,
        })
    }

    /// Forget any eclipse buffer override once the initial trade has fired
    pub async fn clear_eclipse_buffer(&self, symbol: &str) {
        if let Some(entry) = self.overrides.write().await.get_mut(symbol) {
            entry.eclipse_buffer = None;
        }
    }

    /// Symbol configuration persisted alongside the initial trade
    pub fn initial_trade_config(symbol: &str, resolved: &ResolvedConfig) -> SymbolConfig {
        SymbolConfig {
            symbol: symbol.to_string(),
            gap: resolved.gap,
            eclipse_buffer: Decimal::ZERO,
            volume: resolved.volume,
        }
    }

    /// Remember the tick's positive overrides for later ticks of the symbol
    pub async fn commit_overrides(&self, tick: &PriceTick) {
        let (gap, eclipse_buffer) = tick_overrides(tick);
        if gap.is_none() && eclipse_buffer.is_none() {
            return;
        }

        let mut overrides = self.overrides.write().await;
        let entry = overrides.entry(tick.symbol.clone()).or_default();
        entry.gap = gap.or(entry.gap);
        entry.eclipse_buffer = eclipse_buffer.or(entry.eclipse_buffer);
        debug!(symbol = %tick.symbol, gap = ?entry.gap, eclipse_buffer = ?entry.eclipse_buffer, "Recorded config override");
    }

    async fn merged_overrides(&self, tick: &PriceTick) -> SymbolOverride {
        let stored = self
            .overrides
            .read()
            .await
            .get(&tick.symbol)
            .cloned()
            .unwrap_or_default();
        let (gap, eclipse_buffer) = tick_overrides(tick);

        SymbolOverride {
            gap: gap.or(stored.gap),
            eclipse_buffer: eclipse_buffer.or(stored.eclipse_buffer),
        }
    }
}

fn tick_overrides(tick: &PriceTick) -> (Option<Decimal>, Option<Decimal>) {
    (
        tick.gap.filter(|gap| *gap > Decimal::ZERO),
        tick.eclipse_buffer.filter(|buffer| *buffer > Decimal::ZERO),
    )
}
