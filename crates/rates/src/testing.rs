//! Fixtures shared by the tests of this crate and of its consumers.
//!
//! Enabled for downstream crates through the `test-util` feature.

use crate::cache::{RateCache, StoredRateCache};
use crate::clock::FixedClock;
use crate::converter::CurrencyConverter;
use crate::fetcher::RateFetcher;
use crate::provider::RateProvider;
use crate::store::InMemoryStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hours_common::{RateTable, Result};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Provider {}

    #[async_trait]
    impl RateProvider for Provider {
        async fn fetch_rates(&self) -> anyhow::Result<RateTable>;
        fn name(&self) -> &str;
    }
}

/// Instant every fixture clock starts at
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

/// INR-based table with the given rates
pub fn rate_table(rates: &[(&str, f64)]) -> RateTable {
    RateTable::new(
        "INR",
        rates
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect(),
    )
}

/// Provider that fails every fetch
pub fn offline_provider() -> MockProvider {
    let mut provider = MockProvider::new();
    provider.expect_name().return_const("mock".to_string());
    provider
        .expect_fetch_rates()
        .returning(|| Err(anyhow::anyhow!("offline")));
    provider
}

/// INR converter whose in-memory cache holds `rates`, fetched just now,
/// and whose provider is offline
pub async fn seeded_converter(rates: &[(&str, f64)]) -> Result<Arc<CurrencyConverter>> {
    let now = fixed_now();
    let cache = Arc::new(StoredRateCache::new(Arc::new(InMemoryStore::new())));
    cache.store_rates(&rate_table(rates), now).await?;

    let clock = Arc::new(FixedClock::new(now));
    let fetcher = RateFetcher::new(Arc::new(offline_provider()), cache.clone(), clock.clone());
    Ok(Arc::new(CurrencyConverter::new(
        "INR",
        cache,
        fetcher,
        clock,
        Duration::days(2),
    )))
}
