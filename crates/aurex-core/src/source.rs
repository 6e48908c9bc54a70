use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data_source::Category;
use crate::ValidationError;

/// Canonical upstream provider identifiers.
///
/// Variants are listed in fallback priority order within each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "exchangerate_api")]
    ExchangeRateApi,
    #[serde(rename = "open_er_api")]
    OpenErApi,
    #[serde(rename = "fxratesapi")]
    FxRatesApi,
    #[serde(rename = "metals_live")]
    MetalsLive,
    #[serde(rename = "exchangerate_host")]
    ExchangeRateHost,
    #[serde(rename = "fxratesapi_gold")]
    FxRatesApiGold,
    #[serde(rename = "goldapi")]
    GoldApi,
}

impl ProviderId {
    pub const ALL: [Self; 7] = [
        Self::ExchangeRateApi,
        Self::OpenErApi,
        Self::FxRatesApi,
        Self::MetalsLive,
        Self::ExchangeRateHost,
        Self::FxRatesApiGold,
        Self::GoldApi,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExchangeRateApi => "exchangerate_api",
            Self::OpenErApi => "open_er_api",
            Self::FxRatesApi => "fxratesapi",
            Self::MetalsLive => "metals_live",
            Self::ExchangeRateHost => "exchangerate_host",
            Self::FxRatesApiGold => "fxratesapi_gold",
            Self::GoldApi => "goldapi",
        }
    }

    /// Human-facing name shown by the data-source indicator.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ExchangeRateApi => "ExchangeRate-API",
            Self::OpenErApi => "Open ExchangeRate",
            Self::FxRatesApi | Self::FxRatesApiGold => "FX Rates API",
            Self::MetalsLive => "Metals.live",
            Self::ExchangeRateHost => "ExchangeRate.host",
            Self::GoldApi => "Gold API",
        }
    }

    pub const fn category(self) -> Category {
        match self {
            Self::ExchangeRateApi | Self::OpenErApi | Self::FxRatesApi => Category::ExchangeRates,
            Self::MetalsLive | Self::ExchangeRateHost | Self::FxRatesApiGold | Self::GoldApi => {
                Category::GoldSpot
            }
        }
    }

    pub const fn requires_credentials(self) -> bool {
        matches!(self, Self::GoldApi)
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == normalized.as_str())
            .ok_or_else(|| ValidationError::InvalidSource {
                value: normalized.clone(),
            })
    }
}
