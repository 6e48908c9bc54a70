//! USD-based upstream quotes to CNY display prices.
//!
//! | Instrument | Price |
//! |------------|-------|
//! | USD | `r` |
//! | CHF | `r / rates.CHF` |
//! | JPY | `r / rates.JPY * 100` |
//! | XAU | `spot * r / 31.1035` (per gram) |
//!
//! where `r = rates.CNY`, then `rates.RMB`. Missing rates fall back to fixed
//! constants and mark the record as degraded; they never fail the conversion.

use thiserror::Error;

use crate::data_source::Category;
use crate::{ConversionRecipe, Instrument, PriceRecord, RawQuote, ValidationError};

/// CNY per USD when neither `CNY` nor `RMB` is quoted.
pub const DEFAULT_CNY_PER_USD: f64 = 7.25;
/// CHF per USD when `CHF` is not quoted.
pub const DEFAULT_CHF_PER_USD: f64 = 0.88;
/// JPY per USD when `JPY` is not quoted.
pub const DEFAULT_JPY_PER_USD: f64 = 155.0;
/// Grams in one troy ounce.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

/// Forex perturbation: `Δ ∈ [-0.1%, 0.1%)` of price.
const FOREX_VOLATILITY: f64 = 0.002;
/// Gold perturbation: `Δ ∈ [-2.5, 2.5)` CNY.
const GOLD_SWING: f64 = 5.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("expected a {expected} quote, got {found}")]
    WrongCategory { expected: Category, found: Category },
    #[error("gold conversion requires a gold spot quote")]
    MissingGoldSpot,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Converted mid price before open/high/low synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidPrice {
    pub price: f64,
    /// Set when any fallback constant was used.
    pub degraded: bool,
}

/// Computes the CNY mid price for `recipe`.
///
/// # Errors
///
/// Fails only on payloads of the wrong shape: a non-rate quote for `forex`,
/// or a missing or non-spot quote for gold.
pub fn mid_price(
    recipe: ConversionRecipe,
    forex: &RawQuote,
    gold: Option<&RawQuote>,
) -> Result<MidPrice, ConversionError> {
    expect_category(forex, Category::ExchangeRates)?;

    let quoted_cny = forex.rate("CNY").or_else(|| forex.rate("RMB"));
    let cny_per_usd = quoted_cny.unwrap_or(DEFAULT_CNY_PER_USD);
    let mut degraded = quoted_cny.is_none();

    let price = match recipe {
        ConversionRecipe::CnyPerUsd => cny_per_usd,
        ConversionRecipe::CnyPerCurrency {
            code,
            default_usd_rate,
            units,
        } => {
            let quoted = forex.rate(code);
            degraded |= quoted.is_none();
            cny_per_usd / quoted.unwrap_or(default_usd_rate) * units
        }
        ConversionRecipe::GoldPerGram => {
            let gold = gold.ok_or(ConversionError::MissingGoldSpot)?;
            expect_category(gold, Category::GoldSpot)?;
            let spot = gold.spot_usd().ok_or(ConversionError::MissingGoldSpot)?;
            spot * cny_per_usd / GRAMS_PER_TROY_OUNCE
        }
    };

    Ok(MidPrice { price, degraded })
}

fn expect_category(quote: &RawQuote, expected: Category) -> Result<(), ConversionError> {
    if quote.category() == expected {
        Ok(())
    } else {
        Err(ConversionError::WrongCategory {
            expected,
            found: quote.category(),
        })
    }
}

/// Live conversion with randomized open/high/low.
#[derive(Debug, Clone)]
pub struct ConversionEngine {
    rng: fastrand::Rng,
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionEngine {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Converts upstream quotes into a live [`PriceRecord`] for `instrument`.
    pub fn convert(
        &mut self,
        instrument: &Instrument,
        forex: &RawQuote,
        gold: Option<&RawQuote>,
    ) -> Result<PriceRecord, ConversionError> {
        let mid = mid_price(instrument.recipe, forex, gold)?;
        let delta = match instrument.recipe {
            ConversionRecipe::GoldPerGram => (self.rng.f64() - 0.5) * GOLD_SWING,
            _ => (self.rng.f64() - 0.5) * FOREX_VOLATILITY * mid.price,
        };
        Ok(PriceRecord::around(
            instrument.id,
            mid.price,
            delta,
            mid.degraded,
        )?)
    }
}
