//! Quote source trait and provider-level error types.
//!
//! Every upstream provider implements [`QuoteSource`]: one HTTP GET against
//! one endpoint, normalized into a [`RawQuote`] for the category it answers.
//!
//! # Categories
//!
//! | Category | Payload | Consumers |
//! |----------|---------|-----------|
//! | [`Category::ExchangeRates`] | USD-based rate map | every instrument |
//! | [`Category::GoldSpot`] | spot gold in USD per troy ounce | gold |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ProviderId, RawQuote, ValidationError};

/// Class of upstream data fetched and cached independently of instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ExchangeRates,
    GoldSpot,
}

impl Category {
    pub const ALL: [Self; 2] = [Self::ExchangeRates, Self::GoldSpot];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExchangeRates => "exchange_rates",
            Self::GoldSpot => "gold_spot",
        }
    }

    /// Short label used by the data-source indicator.
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExchangeRates => "forex",
            Self::GoldSpot => "gold",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exchange_rates" | "forex" => Ok(Self::ExchangeRates),
            "gold_spot" | "gold" => Ok(Self::GoldSpot),
            other => Err(ValidationError::InvalidCategory {
                value: other.to_owned(),
            }),
        }
    }
}

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Transport,
    Status,
    Parse,
    RateLimited,
    CredentialsMissing,
    Internal,
}

/// Structured provider failure, recovered by trying the next provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            kind: SourceErrorKind::Status,
            message: format!("upstream returned status {status}"),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Parse,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn credentials_missing(provider: ProviderId) -> Self {
        Self {
            kind: SourceErrorKind::CredentialsMissing,
            message: format!("source '{provider}' requires credentials that are not configured"),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Status => "source.status",
            SourceErrorKind::Parse => "source.parse",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::CredentialsMissing => "source.credentials_missing",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Boxed future returned by [`QuoteSource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<RawQuote, SourceError>> + Send + 'a>>;

/// Upstream quote source contract.
///
/// Implementations perform a single request per call and never retry; the
/// resolver owns fallback. Implementations must be `Send + Sync` because one
/// instance is shared by the resolver for the lifetime of the monitor.
pub trait QuoteSource: Send + Sync {
    /// Returns the unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Returns the category this source answers.
    fn category(&self) -> Category {
        self.id().category()
    }

    /// Whether the source may be invoked at all.
    ///
    /// Sources that need credentials report `false` until one is configured;
    /// the resolver skips them without a network call.
    fn is_configured(&self) -> bool {
        true
    }

    /// Fetches and normalizes the latest payload.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if:
    /// - The transport fails or the upstream returns a non-success status
    /// - The body cannot be parsed into the fields conversion requires
    /// - The provider's rate budget is exhausted
    fn fetch<'a>(&'a self) -> FetchFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_indicator_aliases() {
        assert_eq!("forex".parse::<Category>(), Ok(Category::ExchangeRates));
        assert_eq!("GOLD_SPOT".parse::<Category>(), Ok(Category::GoldSpot));
        assert!("silver".parse::<Category>().is_err());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SourceError::status(503).code(), "source.status");
        assert_eq!(
            SourceError::credentials_missing(ProviderId::GoldApi).kind(),
            SourceErrorKind::CredentialsMissing
        );
        assert!(SourceError::status(503).to_string().contains("503"));
    }
}
