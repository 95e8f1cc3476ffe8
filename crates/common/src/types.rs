use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Reference currency every rate is expressed against
pub const DEFAULT_BASE_CURRENCY: &str = "INR";
/// Hourly wage used when none has been saved
pub const DEFAULT_HOURLY_WAGE: f64 = 100.0;

/// Exchange-rate table relative to a single base currency.
///
/// Each entry is "units of that currency per one unit of the base
/// currency". The table is replaced wholesale on refresh and serialized in
/// the same shape the rate API returns, so unknown response fields are
/// simply ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    pub base_code: String,
    pub conversion_rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn new(base_code: impl Into<String>, conversion_rates: BTreeMap<String, f64>) -> Self {
        Self {
            base_code: base_code.into(),
            conversion_rates,
        }
    }

    /// Rate for `code`, ignoring zero, negative and non-finite entries
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.conversion_rates
            .get(code)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }

    pub fn len(&self) -> usize {
        self.conversion_rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversion_rates.is_empty()
    }
}

/// Wage settings saved by the options surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(rename = "hourlyWage")]
    pub hourly_wage: f64,
    pub currency: String,
}

impl UserSettings {
    pub fn new(hourly_wage: f64, currency: impl Into<String>) -> Self {
        Self {
            hourly_wage,
            currency: currency.into(),
        }
    }

    /// Defaults for a given base currency
    pub fn defaults_for(base_currency: &str) -> Self {
        Self::new(DEFAULT_HOURLY_WAGE, base_currency)
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self::defaults_for(DEFAULT_BASE_CURRENCY)
    }
}

/// A price as it was read off the page, before any conversion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PriceObservation {
    pub symbol: String,
    pub whole: String,
    pub fraction: Option<String>,
}

impl PriceObservation {
    pub fn new(symbol: impl Into<String>, whole: impl Into<String>, fraction: Option<String>) -> Self {
        Self {
            symbol: symbol.into().trim().to_string(),
            whole: whole.into(),
            fraction,
        }
    }

    /// Price in its native currency.
    ///
    /// Thousands separators are stripped from the whole part; the fraction
    /// is read as hundredths. A missing or unreadable fraction counts as
    /// zero. Returns `None` when the whole part holds no number.
    pub fn price(&self) -> Option<f64> {
        let whole = leading_decimal(&self.whole)?;
        let fraction = self
            .fraction
            .as_deref()
            .and_then(leading_decimal)
            .unwrap_or(Decimal::ZERO);

        (whole + fraction / Decimal::from(100)).to_f64()
    }
}

/// Parses the numeric prefix of a price fragment such as `"1,234."`
fn leading_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();

    let mut seen_dot = false;
    let prefix: String = cleaned
        .chars()
        .take_while(|c| {
            if *c == '.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                c.is_ascii_digit()
            }
        })
        .collect();

    let prefix = prefix.trim_end_matches('.');
    if prefix.is_empty() {
        return None;
    }

    Decimal::from_str(prefix).ok()
}
