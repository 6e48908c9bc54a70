use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conversion::{DEFAULT_CHF_PER_USD, DEFAULT_JPY_PER_USD};
use crate::data_source::Category;
use crate::ValidationError;

/// Identifier of one of the tracked instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstrumentId {
    Xau,
    Usd,
    Chf,
    Jpy,
}

impl InstrumentId {
    /// Catalogue order: refresh order and chart series order.
    pub const ALL: [Self; 4] = [Self::Xau, Self::Usd, Self::Chf, Self::Jpy];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xau => "XAU",
            Self::Usd => "USD",
            Self::Chf => "CHF",
            Self::Jpy => "JPY",
        }
    }

    pub fn instrument(self) -> &'static Instrument {
        match self {
            Self::Xau => &CATALOGUE[0],
            Self::Usd => &CATALOGUE[1],
            Self::Chf => &CATALOGUE[2],
            Self::Jpy => &CATALOGUE[3],
        }
    }
}

impl Display for InstrumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "XAU" => Ok(Self::Xau),
            "USD" => Ok(Self::Usd),
            "CHF" => Ok(Self::Chf),
            "JPY" => Ok(Self::Jpy),
            _ => Err(ValidationError::InvalidInstrument {
                value: value.trim().to_owned(),
            }),
        }
    }
}

/// Instrument family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Metal,
    Forex,
}

/// How a USD-based quote maps onto the instrument's CNY display price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "recipe", rename_all = "snake_case")]
pub enum ConversionRecipe {
    /// Spot gold (USD per troy ounce) to CNY per gram.
    GoldPerGram,
    /// CNY per one US dollar.
    CnyPerUsd,
    /// CNY per `units` of a non-USD currency quoted against USD.
    CnyPerCurrency {
        code: &'static str,
        default_usd_rate: f64,
        units: f64,
    },
}

impl ConversionRecipe {
    /// Categories that must resolve before a live conversion is possible.
    pub const fn required_categories(self) -> &'static [Category] {
        match self {
            Self::GoldPerGram => &[Category::ExchangeRates, Category::GoldSpot],
            Self::CnyPerUsd | Self::CnyPerCurrency { .. } => &[Category::ExchangeRates],
        }
    }
}

/// Static instrument descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: &'static str,
    pub pair: &'static str,
    pub kind: InstrumentKind,
    pub precision: u8,
    pub unit: &'static str,
    pub recipe: ConversionRecipe,
}

impl Instrument {
    /// Rounds a value to the instrument's display precision.
    pub fn round(&self, value: f64) -> f64 {
        let scale = 10_f64.powi(i32::from(self.precision));
        (value * scale).round() / scale
    }

    /// Formats a value at the instrument's display precision.
    pub fn format(&self, value: f64) -> String {
        format!("{value:.prec$}", prec = usize::from(self.precision))
    }
}

pub const CATALOGUE: [Instrument; 4] = [
    Instrument {
        id: InstrumentId::Xau,
        name: "Gold",
        pair: "XAUCNY",
        kind: InstrumentKind::Metal,
        precision: 2,
        unit: "CNY/gram",
        recipe: ConversionRecipe::GoldPerGram,
    },
    Instrument {
        id: InstrumentId::Usd,
        name: "US Dollar",
        pair: "USDCNY",
        kind: InstrumentKind::Forex,
        precision: 4,
        unit: "CNY",
        recipe: ConversionRecipe::CnyPerUsd,
    },
    Instrument {
        id: InstrumentId::Chf,
        name: "Swiss Franc",
        pair: "CHFCNY",
        kind: InstrumentKind::Forex,
        precision: 4,
        unit: "CNY",
        recipe: ConversionRecipe::CnyPerCurrency {
            code: "CHF",
            default_usd_rate: DEFAULT_CHF_PER_USD,
            units: 1.0,
        },
    },
    Instrument {
        id: InstrumentId::Jpy,
        name: "Japanese Yen",
        pair: "JPYCNY",
        kind: InstrumentKind::Forex,
        precision: 4,
        unit: "CNY/100JPY",
        recipe: ConversionRecipe::CnyPerCurrency {
            code: "JPY",
            default_usd_rate: DEFAULT_JPY_PER_USD,
            units: 100.0,
        },
    },
];
