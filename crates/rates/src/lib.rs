//! Exchange-rate caching and conversion.
//!
//! Rates are fetched from the rate API, kept in a persisted key-value store
//! together with their fetch time, and refreshed once they are older than
//! the staleness window.

pub mod cache;
pub mod clock;
pub mod converter;
pub mod fetcher;
pub mod provider;
pub mod store;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod wage;

pub use cache::{CachedRates, RateCache, StoredRateCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use converter::CurrencyConverter;
pub use fetcher::RateFetcher;
pub use provider::{ExchangeRateApiClient, RateProvider};
pub use store::{InMemoryStore, JsonFileStore, KeyValueStore, StorageArea};
pub use wage::{NormalizedWage, WageNormalizer};
