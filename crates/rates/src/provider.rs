use anyhow::{Context, Result};
use async_trait::async_trait;
use hours_common::{Config, HoursError, RateTable};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Source of exchange-rate tables
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch the latest table for the configured base currency
    async fn fetch_rates(&self) -> Result<RateTable>;

    fn name(&self) -> &str;
}

/// Body of `GET /v6/{key}/latest/{base}`
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(default)]
    base_code: String,
    #[serde(default)]
    conversion_rates: BTreeMap<String, f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

/// Client for the exchangerate-api v6 `latest` endpoint
pub struct ExchangeRateApiClient {
    client: Client,
    url: String,
}

impl ExchangeRateApiClient {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent("hours-of-work/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.rates_url(),
            config.api.timeout_secs.map(Duration::from_secs),
        )
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiClient {
    async fn fetch_rates(&self) -> Result<RateTable> {
        debug!("Calling exchange rate API");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| HoursError::Http(e.to_string()))
            .context("Failed to send request to exchange rate API")?;

        let status = response.status();
        if !status.is_success() {
            return Err(HoursError::ApiStatus(status.as_u16()).into());
        }

        let body: LatestRatesResponse = response
            .json()
            .await
            .context("Failed to parse exchange rate response")?;

        if body.result != "success" {
            let reason = body.error_type.unwrap_or(body.result);
            return Err(HoursError::ApiResult(reason).into());
        }

        if body.conversion_rates.is_empty() {
            anyhow::bail!("Exchange rate response carried no conversion rates");
        }

        info!(
            "Fetched {} exchange rates (base {})",
            body.conversion_rates.len(),
            body.base_code
        );

        Ok(RateTable::new(body.base_code, body.conversion_rates))
    }

    fn name(&self) -> &str {
        "exchangerate-api"
    }
}
