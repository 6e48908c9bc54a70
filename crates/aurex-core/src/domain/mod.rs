//! # Domain Models
//!
//! Canonical domain types for the aurex quote layer.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Instrument`] | Static descriptor: name, pair, precision, conversion recipe |
//! | [`InstrumentId`] | One of XAU, USD, CHF, JPY |
//! | [`RawQuote`] | Normalized provider payload tagged with provider and category |
//! | [`PriceRecord`] | Display-ready CNY price card |
//! | [`HistoricalSeries`] | Dated price series for one instrument and period |
//! | [`Period`] | 1M, 6M, 1Y, 3Y or a custom [`DateRange`] |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! ## Validation
//!
//! Constructors enforce the invariants downstream code relies on:
//!
//! ```rust,ignore
//! use aurex_core::{DateRange, ProviderId, RawQuote, ValidationError};
//!
//! // A spot quote must be finite and positive.
//! let quote = RawQuote::spot(ProviderId::MetalsLive, 2_345.6)?;
//!
//! // A custom range must run forwards.
//! let invalid = DateRange::parse("2024-03-01", "2024-02-01");
//! assert!(matches!(invalid, Err(ValidationError::InvalidDateRange { .. })));
//! ```

mod instrument;
mod price;
mod quote;
mod series;
mod timestamp;

pub use instrument::{ConversionRecipe, Instrument, InstrumentId, InstrumentKind, CATALOGUE};
pub use price::{PriceRecord, RecordOrigin};
pub use quote::{QuotePayload, RawQuote};
pub use series::{parse_date, DateRange, HistoricalSeries, Period, SeriesPoint, MAX_RANGE_DAYS};
pub use timestamp::UtcDateTime;
