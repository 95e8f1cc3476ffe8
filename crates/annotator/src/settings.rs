use hours_common::{HoursError, Result, UserSettings, DEFAULT_HOURLY_WAGE};
use hours_rates::{KeyValueStore, StorageArea};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub const HOURLY_WAGE_KEY: &str = "hourlyWage";
pub const CURRENCY_KEY: &str = "currency";

/// Reads and writes the user's wage settings in the `sync` storage area
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
    base_currency: String,
}

impl SettingsService {
    pub fn new(store: Arc<dyn KeyValueStore>, base_currency: impl Into<String>) -> Self {
        Self {
            store,
            base_currency: base_currency.into(),
        }
    }

    /// Saved settings, with defaults for missing or unusable values.
    ///
    /// A storage failure reads as "nothing saved".
    pub async fn load(&self) -> UserSettings {
        let values = match self
            .store
            .get(StorageArea::Sync, &[HOURLY_WAGE_KEY, CURRENCY_KEY])
            .await
        {
            Ok(values) => values,
            Err(e) => {
                warn!("Failed to read saved settings, using defaults: {}", e);
                Map::new()
            }
        };

        let hourly_wage = values
            .get(HOURLY_WAGE_KEY)
            .and_then(Value::as_f64)
            .filter(|wage| wage.is_finite() && *wage > 0.0)
            .unwrap_or(DEFAULT_HOURLY_WAGE);

        let currency = values
            .get(CURRENCY_KEY)
            .and_then(Value::as_str)
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| self.base_currency.clone());

        UserSettings::new(hourly_wage, currency)
    }

    /// Whether anything has been saved yet
    pub async fn has_saved_settings(&self) -> Result<bool> {
        let values = self
            .store
            .get(StorageArea::Sync, &[HOURLY_WAGE_KEY, CURRENCY_KEY])
            .await?;
        Ok(!values.is_empty())
    }

    /// Validate form input and persist it. Nothing is written on error.
    pub async fn save_raw(&self, wage_input: &str, currency: &str) -> Result<UserSettings> {
        let hourly_wage = parse_wage(wage_input)?;
        self.save(UserSettings::new(hourly_wage, currency)).await
    }

    pub async fn save(&self, settings: UserSettings) -> Result<UserSettings> {
        if !settings.hourly_wage.is_finite() || settings.hourly_wage <= 0.0 {
            return Err(HoursError::InvalidWage(settings.hourly_wage.to_string()));
        }
        let currency = normalize_currency(&settings.currency)?;
        let settings = UserSettings::new(settings.hourly_wage, currency);

        let mut entries = Map::new();
        entries.insert(HOURLY_WAGE_KEY.to_string(), Value::from(settings.hourly_wage));
        entries.insert(CURRENCY_KEY.to_string(), Value::from(settings.currency.clone()));
        self.store.set(StorageArea::Sync, entries).await?;

        info!(
            "Hourly wage saved: {} {}",
            settings.hourly_wage, settings.currency
        );
        Ok(settings)
    }
}

/// Parses a wage typed into the settings form; must be a positive number
pub fn parse_wage(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(wage) if wage.is_finite() && wage > 0.0 => Ok(wage),
        _ => Err(HoursError::InvalidWage(trimmed.to_string())),
    }
}

fn normalize_currency(code: &str) -> Result<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(HoursError::InvalidCurrency(code));
    }
    Ok(code)
}
