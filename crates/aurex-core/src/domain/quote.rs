use std::collections::BTreeMap;

use serde::Serialize;

use crate::data_source::Category;
use crate::{ProviderId, UtcDateTime, ValidationError};

/// Normalized upstream payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum QuotePayload {
    /// Currency code to rate, relative to `base`.
    Rates {
        base: String,
        rates: BTreeMap<String, f64>,
    },
    /// Spot gold in US dollars per troy ounce.
    Spot { usd_per_ounce: f64 },
}

/// Provider response after normalization, tagged with its origin.
///
/// Construction goes through [`RawQuote::rates`] and [`RawQuote::spot`], which
/// reject payloads that do not carry the fields conversion requires. Only
/// values built that way can reach the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawQuote {
    provider: ProviderId,
    category: Category,
    payload: QuotePayload,
    fetched_at: UtcDateTime,
}

impl RawQuote {
    /// Builds an exchange-rate quote. Non-finite or non-positive rates are
    /// dropped; an empty map after filtering is rejected.
    pub fn rates(
        provider: ProviderId,
        base: impl Into<String>,
        rates: impl IntoIterator<Item = (String, f64)>,
    ) -> Result<Self, ValidationError> {
        let rates = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(code, rate)| (code.trim().to_ascii_uppercase(), rate))
            .collect::<BTreeMap<_, _>>();
        if rates.is_empty() {
            return Err(ValidationError::NonFiniteValue { field: "rates" });
        }

        Ok(Self {
            provider,
            category: Category::ExchangeRates,
            payload: QuotePayload::Rates {
                base: base.into().trim().to_ascii_uppercase(),
                rates,
            },
            fetched_at: UtcDateTime::now(),
        })
    }

    /// Builds a gold spot quote.
    pub fn spot(provider: ProviderId, usd_per_ounce: f64) -> Result<Self, ValidationError> {
        if !usd_per_ounce.is_finite() || usd_per_ounce <= 0.0 {
            return Err(ValidationError::NonFiniteValue {
                field: "usd_per_ounce",
            });
        }

        Ok(Self {
            provider,
            category: Category::GoldSpot,
            payload: QuotePayload::Spot { usd_per_ounce },
            fetched_at: UtcDateTime::now(),
        })
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub const fn category(&self) -> Category {
        self.category
    }

    pub fn payload(&self) -> &QuotePayload {
        &self.payload
    }

    pub const fn fetched_at(&self) -> UtcDateTime {
        self.fetched_at
    }

    /// Looks up a rate by currency code; `None` for spot payloads.
    pub fn rate(&self, code: &str) -> Option<f64> {
        match &self.payload {
            QuotePayload::Rates { rates, .. } => rates.get(code).copied(),
            QuotePayload::Spot { .. } => None,
        }
    }

    pub fn spot_usd(&self) -> Option<f64> {
        match self.payload {
            QuotePayload::Spot { usd_per_ounce } => Some(usd_per_ounce),
            QuotePayload::Rates { .. } => None,
        }
    }
}
