use serde::{Deserialize, Serialize};

use crate::{InstrumentId, UtcDateTime, ValidationError};

/// Whether a record came from live conversion or from the synthetic generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    Live,
    Synthetic,
}

impl RecordOrigin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Synthetic => "synthetic",
        }
    }
}

/// Display-ready price card for one instrument, in CNY.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub instrument: InstrumentId,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub origin: RecordOrigin,
    /// Set when a fallback constant replaced a missing upstream rate.
    pub degraded: bool,
    pub as_of: UtcDateTime,
}

impl PriceRecord {
    /// Synthesizes open/high/low around a converted mid price.
    ///
    /// `open = price - delta/2`, `high/low = price ± 1.2·|delta|`.
    pub fn around(
        instrument: InstrumentId,
        price: f64,
        delta: f64,
        degraded: bool,
    ) -> Result<Self, ValidationError> {
        let spread = delta.abs() * 1.2;
        let record = Self {
            instrument,
            price,
            change: delta,
            change_percent: if price == 0.0 { 0.0 } else { delta / price * 100.0 },
            open: price - delta * 0.5,
            high: price + spread,
            low: price - spread,
            origin: RecordOrigin::Live,
            degraded,
            as_of: UtcDateTime::now(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("price", self.price),
            ("change", self.change),
            ("change_percent", self.change_percent),
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
        ];
        match fields.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((field, _)) => Err(ValidationError::NonFiniteValue { field }),
            None => Ok(()),
        }
    }

    pub const fn is_synthetic(&self) -> bool {
        matches!(self.origin, RecordOrigin::Synthetic)
    }
}
