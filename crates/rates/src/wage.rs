use crate::converter::CurrencyConverter;
use std::sync::Arc;
use tracing::warn;

/// A wage expressed in the base currency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedWage {
    pub amount: f64,
    /// No rate was known, so `amount` is the raw wage at face value
    pub unconverted: bool,
}

/// Expresses a user's hourly wage in the base currency
pub struct WageNormalizer {
    converter: Arc<CurrencyConverter>,
}

impl WageNormalizer {
    pub fn new(converter: Arc<CurrencyConverter>) -> Self {
        Self { converter }
    }

    /// `raw_wage` converted from `raw_currency` into the base currency.
    ///
    /// When no rate is known the wage is returned unconverted.
    pub async fn get_normalized_wage(&self, raw_wage: f64, raw_currency: &str) -> f64 {
        self.normalize(raw_wage, raw_currency).await.amount
    }

    /// Like [`get_normalized_wage`](Self::get_normalized_wage), but also
    /// reports whether the face-value fallback was taken
    pub async fn normalize(&self, raw_wage: f64, raw_currency: &str) -> NormalizedWage {
        if self.converter.is_base(raw_currency) {
            return NormalizedWage {
                amount: raw_wage,
                unconverted: false,
            };
        }

        match self.converter.convert_from_base(1.0, raw_currency).await {
            Some(rate) => NormalizedWage {
                amount: raw_wage / rate,
                unconverted: false,
            },
            None => {
                warn!(
                    "No rate for {}; comparing against the unconverted wage",
                    raw_currency
                );
                NormalizedWage {
                    amount: raw_wage,
                    unconverted: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::seeded_converter;
    use proptest::prelude::*;

    async fn normalizer_with_rates(rates: &[(&str, f64)]) -> WageNormalizer {
        WageNormalizer::new(seeded_converter(rates).await.unwrap())
    }

    #[tokio::test]
    async fn test_base_currency_wage_is_unchanged() {
        let normalizer = normalizer_with_rates(&[("USD", 0.012)]).await;
        assert_eq!(normalizer.get_normalized_wage(100.0, "INR").await, 100.0);
    }

    #[tokio::test]
    async fn test_foreign_wage_is_divided_by_rate() {
        let normalizer = normalizer_with_rates(&[("USD", 0.0125)]).await;
        let wage = normalizer.normalize(25.0, "USD").await;
        assert!((wage.amount - 2000.0).abs() < 1e-9);
        assert!(!wage.unconverted);
    }

    #[tokio::test]
    async fn test_missing_rate_returns_raw_wage() {
        let normalizer = normalizer_with_rates(&[("USD", 0.012)]).await;
        assert_eq!(
            normalizer.normalize(42.0, "GBP").await,
            NormalizedWage {
                amount: 42.0,
                unconverted: true,
            }
        );
        assert_eq!(normalizer.get_normalized_wage(42.0, "GBP").await, 42.0);
    }

    proptest! {
        #[test]
        fn prop_round_trip_through_rate(amount in 0.01f64..1_000_000.0, rate in 0.0001f64..10_000.0) {
            let back = tokio_test::block_on(async {
                let normalizer = normalizer_with_rates(&[("XTS", rate)]).await;
                // amount in XTS → base currency → back to XTS
                let in_base = normalizer.get_normalized_wage(amount, "XTS").await;
                in_base * rate
            });
            prop_assert!((back - amount).abs() <= amount * 1e-12);
        }
    }
}
