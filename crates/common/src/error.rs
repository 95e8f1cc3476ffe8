use thiserror::Error;

/// Errors surfaced by the hours-of-work crates
#[derive(Debug, Error)]
pub enum HoursError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(String),

    #[error("rate API returned status {0}")]
    ApiStatus(u16),

    #[error("rate API reported failure: {0}")]
    ApiResult(String),

    #[error("Please enter a valid hourly wage (got {0:?})")]
    InvalidWage(String),

    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("conversion rate not available for currency: {0}")]
    MissingRate(String),
}

impl From<toml::de::Error> for HoursError {
    fn from(err: toml::de::Error) -> Self {
        HoursError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HoursError>;
