//! # Aurex Core
//!
//! Multi-source quote acquisition for a small gold and forex price board.
//!
//! ## Overview
//!
//! This crate provides everything behind the price cards:
//!
//! - **Provider adapters** that normalize heterogeneous public JSON APIs into [`RawQuote`]s
//! - **Source resolution** with per-category fallback chains and a short-lived cache
//! - **Conversion** of USD-based rates and gold spot into CNY display prices
//! - **Degradation policy** choosing between live and synthetic data
//! - **Synthetic generator** for substitute cards and chart history
//! - **Monitor and scheduler** driving refresh cycles and pushing events
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (ExchangeRate-API, Open ExchangeRate, FX Rates API, Metals.live, ExchangeRate.host, Gold API) |
//! | [`cache`] | Per-category quote cache with TTL |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`context`] | Shared cache and status board |
//! | [`conversion`] | CNY conversion rules |
//! | [`data_source`] | Quote source trait, categories and provider errors |
//! | [`domain`] | Domain models (Instrument, RawQuote, PriceRecord, HistoricalSeries) |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`monitor`] | Refresh-cycle coordinator and presentation contract |
//! | [`policy`] | Connecting / Live / Synthetic state machine |
//! | [`provider_policy`] | Per-provider request quotas |
//! | [`resolver`] | Fallback chains per category |
//! | [`scheduler`] | Periodic refresh tied to visibility and connectivity |
//! | [`source`] | Provider identifiers |
//! | [`status`] | Per-category provider status |
//! | [`synthetic`] | Synthetic cards and history |
//! | [`throttling`] | Rate limiting support |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use aurex_core::{MonitorConfig, PriceMonitor, RefreshScheduler, SourceResolverBuilder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = MonitorConfig::default();
//!     let resolver = SourceResolverBuilder::from_config(&config).build();
//!     let monitor = Arc::new(PriceMonitor::new(resolver, &config));
//!
//!     let report = monitor.start().await;
//!     for record in &report.records {
//!         println!("{} {:.4}", record.instrument, record.price);
//!     }
//!
//!     let scheduler = RefreshScheduler::spawn(monitor, config.refresh_interval());
//!     scheduler.shutdown().await;
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ RefreshScheduler│────▶│  PriceMonitor    │──▶ MonitorEvent
//! └─────────────────┘     └────────┬─────────┘
//!                                  │
//!                 ┌────────────────┼────────────────┐
//!                 ▼                ▼                ▼
//!        ┌────────────────┐ ┌──────────────┐ ┌──────────────┐
//!        │ SourceResolver │ │ Conversion   │ │ Synthetic    │
//!        │ + QuoteCache   │ │ Engine       │ │ Generator    │
//!        └───────┬────────┘ └──────────────┘ └──────────────┘
//!                ▼
//!        ┌────────────────┐     ┌──────────────────┐
//!        │ QuoteSource    │────▶│ HttpClient       │
//!        │ (adapters)     │     │ (reqwest/fixture)│
//!        └────────────────┘     └──────────────────┘
//! ```
//!
//! ## Failure Handling
//!
//! No failure is fatal. A provider failure moves the resolver to the next
//! provider; a category failure marks its status as failed and the affected
//! instruments receive synthetic records for that cycle:
//!
//! ```rust,ignore
//! use aurex_core::{Category, MonitorEvent};
//!
//! let mut events = monitor.subscribe();
//! while let Ok(event) = events.recv().await {
//!     if let MonitorEvent::UpdateFailed { instrument, message } = event {
//!         eprintln!("{instrument}: live data unavailable: {message}");
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The Gold API key is read from configuration or the environment and never logged
//! - Adapters without credentials are skipped, never invoked

pub mod adapters;
pub mod cache;
pub mod config;
pub mod context;
pub mod conversion;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod monitor;
pub mod policy;
pub mod provider_policy;
pub mod resolver;
pub mod scheduler;
pub mod source;
pub mod status;
pub mod synthetic;
pub mod throttling;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{
    default_sources, ExchangeRateApiAdapter, ExchangeRateHostAdapter, FxRatesApiAdapter,
    FxRatesApiGoldAdapter, GoldApiAdapter, MetalsLiveAdapter, OpenErApiAdapter, ProviderTransport,
};

// Caching
pub use cache::{CacheEntry, QuoteCache, StaleFallback};

// Configuration
pub use config::{MonitorConfig, ProvidersConfig};

// Shared state
pub use context::MonitorContext;

// Conversion
pub use conversion::{mid_price, ConversionEngine, ConversionError, MidPrice};

// Data source trait and types
pub use data_source::{Category, FetchFuture, QuoteSource, SourceError, SourceErrorKind};

// Domain models
pub use domain::{
    parse_date, ConversionRecipe, DateRange, HistoricalSeries, Instrument, InstrumentId,
    InstrumentKind, Period, PriceRecord, QuotePayload, RawQuote, RecordOrigin, SeriesPoint,
    UtcDateTime, CATALOGUE, MAX_RANGE_DAYS,
};

// Error types
pub use error::{ConfigError, ValidationError};

// HTTP client types
pub use http_client::{
    FixtureHttpClient, HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Monitor
pub use monitor::{CycleReport, InstrumentFailure, MonitorEvent, PriceMonitor};

// Degradation policy
pub use policy::{DataMode, DegradationPolicy, ProbeOutcome};

// Provider policies
pub use provider_policy::ProviderPolicy;

// Resolution
pub use resolver::{
    ProviderFailure, ResolutionFailure, ResolveResult, Resolved, SourceResolver,
    SourceResolverBuilder,
};

// Scheduling
pub use scheduler::{RefreshScheduler, SchedulerHandle, Signals};

// Source identifiers
pub use source::ProviderId;

// Provider status
pub use status::{ProviderStatus, StatusBoard};

// Synthetic data
pub use synthetic::{Baseline, SyntheticGenerator};

// Throttling
pub use throttling::RateBudget;
