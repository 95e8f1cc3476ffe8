use crate::annotator::{AnnotationReport, AnnotatorOptions, PriceAnnotator};
use crate::dom::PriceDom;
use crate::settings::SettingsService;
use anyhow::Result;
use chrono::{DateTime, Utc};
use hours_common::{Config, UserSettings};
use hours_rates::{
    Clock, CurrencyConverter, ExchangeRateApiClient, JsonFileStore, KeyValueStore, RateFetcher,
    NormalizedWage, RateProvider, StoredRateCache, SystemClock, WageNormalizer,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// State of the rate cache as shown by `rates show`
#[derive(Debug, Clone, Serialize)]
pub struct RateStatus {
    pub base_currency: String,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_hours: Option<f64>,
    pub fresh: bool,
    pub currencies: usize,
}

/// Result of annotating one page
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub settings: UserSettings,
    pub normalized_wage: f64,
    /// No rate was known for the wage currency; the raw wage was used
    pub wage_unconverted: bool,
    #[serde(flatten)]
    pub annotations: AnnotationReport,
}

/// Every component wired together over one store and one rate provider
pub struct HoursApp {
    config: Config,
    settings: SettingsService,
    converter: Arc<CurrencyConverter>,
    normalizer: WageNormalizer,
    clock: Arc<dyn Clock>,
}

impl HoursApp {
    /// File-backed storage and the live rate API
    pub fn from_config(config: Config) -> Result<Self> {
        let store = Arc::new(JsonFileStore::new(config.storage_dir()));
        let provider = Arc::new(ExchangeRateApiClient::from_config(&config)?);
        Ok(Self::with_parts(config, store, provider, Arc::new(SystemClock)))
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn RateProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(StoredRateCache::new(store.clone()));
        let fetcher = RateFetcher::new(provider, cache.clone(), clock.clone());
        let converter = Arc::new(CurrencyConverter::new(
            config.base_currency.clone(),
            cache,
            fetcher,
            clock.clone(),
            config.staleness_window(),
        ));

        Self {
            settings: SettingsService::new(store, config.base_currency.clone()),
            normalizer: WageNormalizer::new(converter.clone()),
            converter,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    /// First-run hook: seed default settings when none exist
    pub async fn install(&self) -> Result<UserSettings> {
        let saved = match self.settings.has_saved_settings().await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Saved settings are unreadable and will be reset: {}", e);
                false
            }
        };
        let settings = if saved {
            self.settings.load().await
        } else {
            self.settings
                .save(UserSettings::defaults_for(&self.config.base_currency))
                .await?
        };
        info!("Extension installed");
        Ok(settings)
    }

    pub async fn rate_status(&self) -> RateStatus {
        let cached = self.converter.cached_rates().await;
        let now = self.clock.now();
        let age_hours = cached
            .age(now)
            .map(|age| age.num_seconds() as f64 / 3600.0);

        RateStatus {
            base_currency: self.converter.base_currency().to_string(),
            fetched_at: cached.last_update,
            age_hours,
            fresh: cached.is_fresh(now, self.config.staleness_window()),
            currencies: cached.table.as_ref().map_or(0, |table| table.len()),
        }
    }

    /// Saved wage in the base currency
    pub async fn normalized_wage(&self) -> (UserSettings, NormalizedWage) {
        let settings = self.settings.load().await;
        let wage = self
            .normalizer
            .normalize(settings.hourly_wage, &settings.currency)
            .await;
        (settings, wage)
    }

    /// One page pass: normalize the wage first, then annotate each price
    pub async fn annotate_page<D>(&self, dom: &mut D, options: AnnotatorOptions) -> PageReport
    where
        D: PriceDom + ?Sized,
    {
        let (settings, wage) = self.normalized_wage().await;

        let annotator = PriceAnnotator::new(self.converter.clone(), self.config.symbol_table())
            .with_options(options);
        let annotations = annotator.annotate(dom, wage.amount).await;

        PageReport {
            settings,
            normalized_wage: wage.amount,
            wage_unconverted: wage.unconverted,
            annotations,
        }
    }
}
