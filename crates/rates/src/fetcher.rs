use crate::cache::RateCache;
use crate::clock::Clock;
use crate::provider::RateProvider;
use hours_common::RateTable;
use std::sync::Arc;
use tracing::{error, info};

/// Fetches a fresh rate table and writes it to the cache.
///
/// A single attempt per call. Failures are logged and leave the cache as it
/// was; the next consumer that finds the cache stale will try again.
pub struct RateFetcher {
    provider: Arc<dyn RateProvider>,
    cache: Arc<dyn RateCache>,
    clock: Arc<dyn Clock>,
}

impl RateFetcher {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        cache: Arc<dyn RateCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache,
            clock,
        }
    }

    /// Fetch and store; returns the new table when both steps succeeded
    pub async fn refresh(&self) -> Option<RateTable> {
        let table = match self.provider.fetch_rates().await {
            Ok(table) => table,
            Err(e) => {
                error!("Failed to fetch exchange rates from {}: {:#}", self.provider.name(), e);
                return None;
            }
        };

        let fetched_at = self.clock.now();
        if let Err(e) = self.cache.store_rates(&table, fetched_at).await {
            error!("Failed to store exchange rates: {}", e);
            return None;
        }

        info!(
            "Exchange rates refreshed from {} ({} currencies)",
            self.provider.name(),
            table.len()
        );
        Some(table)
    }
}
