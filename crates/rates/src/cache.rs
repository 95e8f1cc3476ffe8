use crate::store::{KeyValueStore, StorageArea};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hours_common::{RateTable, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

/// Storage key of the cached rate table
pub const RATES_KEY: &str = "exchangeRatesData";
/// Storage key of the fetch time, in epoch milliseconds
pub const LAST_UPDATE_KEY: &str = "lastUpdateTime";

/// What the cache currently holds; either half may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedRates {
    pub table: Option<RateTable>,
    pub last_update: Option<DateTime<Utc>>,
}

impl CachedRates {
    /// Age of the table at `now`, if a fetch time is known
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_update.map(|fetched_at| now - fetched_at)
    }

    /// Usable without a refresh: both halves present and no older than `window`
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.table.is_some() && self.age(now).is_some_and(|age| age <= window)
    }
}

/// Cache of the last fetched rate table
#[async_trait]
pub trait RateCache: Send + Sync {
    async fn load_cached_rates(&self) -> Result<CachedRates>;
    async fn store_rates(&self, table: &RateTable, fetched_at: DateTime<Utc>) -> Result<()>;
}

/// Rate cache kept in the `local` area of a key-value store
pub struct StoredRateCache {
    store: Arc<dyn KeyValueStore>,
}

impl StoredRateCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RateCache for StoredRateCache {
    async fn load_cached_rates(&self) -> Result<CachedRates> {
        let values = self
            .store
            .get(StorageArea::Local, &[RATES_KEY, LAST_UPDATE_KEY])
            .await?;

        // A corrupt entry is treated as absent so the next read refetches
        let table = match values.get(RATES_KEY) {
            Some(value) => match serde_json::from_value::<RateTable>(value.clone()) {
                Ok(table) => Some(table),
                Err(e) => {
                    warn!("Ignoring unreadable cached rate table: {}", e);
                    None
                }
            },
            None => None,
        };

        let last_update = values
            .get(LAST_UPDATE_KEY)
            .and_then(Value::as_i64)
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        Ok(CachedRates { table, last_update })
    }

    async fn store_rates(&self, table: &RateTable, fetched_at: DateTime<Utc>) -> Result<()> {
        let mut entries = Map::new();
        entries.insert(RATES_KEY.to_string(), serde_json::to_value(table)?);
        entries.insert(
            LAST_UPDATE_KEY.to_string(),
            Value::from(fetched_at.timestamp_millis()),
        );
        // Both keys go in one write so readers never see a mixed pair
        self.store.set(StorageArea::Local, entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn sample_table() -> RateTable {
        let mut rates = BTreeMap::new();
        rates.insert("INR".to_string(), 1.0);
        rates.insert("USD".to_string(), 0.012);
        RateTable::new("INR", rates)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_empty_cache_loads_nothing() {
        let cache = StoredRateCache::new(Arc::new(InMemoryStore::new()));
        let cached = cache.load_cached_rates().await.unwrap();
        assert_eq!(cached, CachedRates::default());
        assert!(!cached.is_fresh(at(0), Duration::days(2)));
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let store = Arc::new(InMemoryStore::new());
        let cache = StoredRateCache::new(store.clone());
        let fetched_at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();

        cache.store_rates(&sample_table(), fetched_at).await.unwrap();

        let cached = cache.load_cached_rates().await.unwrap();
        assert_eq!(cached.table, Some(sample_table()));
        assert_eq!(cached.last_update, Some(fetched_at));

        // Fetch time is kept as epoch milliseconds
        let raw = store.get(StorageArea::Local, &[LAST_UPDATE_KEY]).await.unwrap();
        assert_eq!(raw[LAST_UPDATE_KEY], json!(1_700_000_000_123_i64));
    }

    #[tokio::test]
    async fn test_corrupt_table_reads_as_absent() {
        let store = Arc::new(InMemoryStore::new());
        let mut entries = Map::new();
        entries.insert(RATES_KEY.to_string(), json!("not a table"));
        entries.insert(LAST_UPDATE_KEY.to_string(), json!(1_700_000_000_000_i64));
        store.set(StorageArea::Local, entries).await.unwrap();

        let cached = StoredRateCache::new(store).load_cached_rates().await.unwrap();
        assert!(cached.table.is_none());
        assert!(cached.last_update.is_some());
    }

    #[test]
    fn test_freshness_boundary() {
        let window = Duration::days(2);
        let cached = CachedRates {
            table: Some(sample_table()),
            last_update: Some(at(1_700_000_000)),
        };

        assert!(cached.is_fresh(at(1_700_000_000), window));
        assert!(cached.is_fresh(at(1_700_000_000) + window, window));
        assert!(!cached.is_fresh(at(1_700_000_000) + window + Duration::seconds(1), window));
    }

    #[test]
    fn test_missing_timestamp_is_stale() {
        let cached = CachedRates {
            table: Some(sample_table()),
            last_update: None,
        };
        assert!(!cached.is_fresh(at(1_700_000_000), Duration::days(2)));
    }
}
