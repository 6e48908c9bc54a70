use std::path::PathBuf;

use thiserror::Error;

/// Validation and contract errors exposed by `aurex-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid instrument '{value}', expected one of XAU, USD, CHF, JPY")]
    InvalidInstrument { value: String },
    #[error("invalid category '{value}', expected one of exchange_rates, gold_spot")]
    InvalidCategory { value: String },
    #[error("invalid source '{value}', expected one of exchangerate_api, open_er_api, fxratesapi, metals_live, exchangerate_host, fxratesapi_gold, goldapi")]
    InvalidSource { value: String },

    #[error("invalid period '{value}', expected one of 1M, 6M, 1Y, 3Y")]
    InvalidPeriod { value: String },
    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("range start {start} must be before range end {end}")]
    InvalidDateRange { start: String, end: String },
    #[error("range spans {days} days, at most {max} are supported")]
    DateRangeTooLong { days: i64, max: i64 },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}
