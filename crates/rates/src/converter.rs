use crate::cache::{CachedRates, RateCache};
use crate::clock::Clock;
use crate::fetcher::RateFetcher;
use chrono::Duration;
use hours_common::{HoursError, Result};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Looks up conversion factors from the base currency, refreshing the
/// cached table when it is missing or older than the staleness window
pub struct CurrencyConverter {
    base_currency: String,
    cache: Arc<dyn RateCache>,
    fetcher: RateFetcher,
    clock: Arc<dyn Clock>,
    staleness: Duration,
}

impl CurrencyConverter {
    pub fn new(
        base_currency: impl Into<String>,
        cache: Arc<dyn RateCache>,
        fetcher: RateFetcher,
        clock: Arc<dyn Clock>,
        staleness: Duration,
    ) -> Self {
        Self {
            base_currency: base_currency.into(),
            cache,
            fetcher,
            clock,
            staleness,
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn is_base(&self, currency: &str) -> bool {
        currency.eq_ignore_ascii_case(&self.base_currency)
    }

    /// Current cache contents; a storage failure reads as an empty cache
    pub async fn cached_rates(&self) -> CachedRates {
        match self.cache.load_cached_rates().await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Failed to read cached exchange rates: {}", e);
                CachedRates::default()
            }
        }
    }

    /// Whether the cache can be used as-is right now
    pub async fn is_cache_fresh(&self) -> bool {
        self.cached_rates()
            .await
            .is_fresh(self.clock.now(), self.staleness)
    }

    /// Forces one fetch attempt regardless of cache age
    pub async fn refresh(&self) -> bool {
        self.fetcher.refresh().await.is_some()
    }

    /// Units of `currency` per one unit of the base currency.
    ///
    /// Triggers at most one refresh when the cache is stale, then answers
    /// from whatever the cache holds afterwards. `None` when no rate is
    /// known for `currency`.
    pub async fn get_conversion_rate(&self, currency: &str) -> Option<f64> {
        let currency = currency.trim().to_ascii_uppercase();

        if self.is_cache_fresh().await {
            debug!("Using cached exchange rates data");
        } else {
            self.fetcher.refresh().await;
        }

        let cached = self.cached_rates().await;
        match cached.table.as_ref().and_then(|table| table.rate(&currency)) {
            Some(rate) => Some(rate),
            None => {
                error!("Conversion rate not available for currency: {}", currency);
                None
            }
        }
    }

    /// `amount` of base currency expressed in `currency`
    pub async fn convert_from_base(&self, amount: f64, currency: &str) -> Option<f64> {
        self.get_conversion_rate(currency)
            .await
            .map(|rate| amount * rate)
    }

    /// [`convert_from_base`](Self::convert_from_base) for callers that treat
    /// a missing rate as an error instead of falling back to face value
    pub async fn try_convert_from_base(&self, amount: f64, currency: &str) -> Result<f64> {
        self.convert_from_base(amount, currency)
            .await
            .ok_or_else(|| HoursError::MissingRate(currency.trim().to_ascii_uppercase()))
    }
}
