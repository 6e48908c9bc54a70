//! Per-category provider fallback with a short-lived cache in front.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::adapters::default_sources;
use crate::cache::StaleFallback;
use crate::config::MonitorConfig;
use crate::context::MonitorContext;
use crate::data_source::{Category, QuoteSource, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::status::ProviderStatus;
use crate::{ProviderId, RawQuote};

/// One provider that failed during a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub error: SourceError,
}

impl Display for ProviderFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Successful resolution of a category.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub quote: RawQuote,
    pub selected_source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    /// Failures recovered by moving down the chain.
    pub errors: Vec<ProviderFailure>,
    pub from_cache: bool,
    pub stale: bool,
    pub latency_ms: u64,
}

/// Every configured provider failed and nothing was served from cache.
#[derive(Debug, Clone)]
pub struct ResolutionFailure {
    pub category: Category,
    pub source_chain: Vec<ProviderId>,
    pub errors: Vec<ProviderFailure>,
    pub latency_ms: u64,
}

impl Display for ResolutionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no configured provider for {}", self.category);
        }
        write!(f, "all providers failed for {}", self.category)?;
        for failure in &self.errors {
            write!(f, "; {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolutionFailure {}

pub type ResolveResult = Result<Resolved, ResolutionFailure>;

/// Registry of provider chains keyed by category.
pub struct SourceResolver {
    chains: BTreeMap<Category, Vec<Arc<dyn QuoteSource>>>,
    stale_fallback: StaleFallback,
}

impl SourceResolver {
    /// Groups `sources` by category, keeping their order as priority order.
    pub fn new(sources: Vec<Arc<dyn QuoteSource>>) -> Self {
        let mut chains: BTreeMap<Category, Vec<Arc<dyn QuoteSource>>> = BTreeMap::new();
        for source in sources {
            chains.entry(source.category()).or_default().push(source);
        }
        Self {
            chains,
            stale_fallback: StaleFallback::Fail,
        }
    }

    pub fn with_stale_fallback(mut self, stale_fallback: StaleFallback) -> Self {
        self.stale_fallback = stale_fallback;
        self
    }

    pub const fn stale_fallback(&self) -> StaleFallback {
        self.stale_fallback
    }

    /// Provider ids for `category` in priority order, configured or not.
    pub fn chain(&self, category: Category) -> Vec<ProviderId> {
        self.sources(category)
            .iter()
            .map(|source| source.id())
            .collect()
    }

    pub fn sources(&self, category: Category) -> &[Arc<dyn QuoteSource>] {
        self.chains
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolves `category` from the cache or the first provider that succeeds.
    ///
    /// A fresh cache entry is returned without any provider call and leaves
    /// the status board untouched. On a fresh fetch the quote replaces the
    /// cache entry and the provider becomes the category's status. When the
    /// whole chain fails the status becomes [`ProviderStatus::Failed`] and
    /// the cache is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionFailure`] when every configured provider failed and
    /// the stale fallback did not apply.
    pub async fn resolve(&self, ctx: &MonitorContext, category: Category) -> ResolveResult {
        let started = Instant::now();

        if let Some(entry) = ctx.cache.fresh(category).await {
            debug!(
                category = %category,
                provider = %entry.quote.provider(),
                age_ms = entry.age().as_millis() as u64,
                "cache hit"
            );
            return Ok(Resolved {
                selected_source: entry.quote.provider(),
                quote: entry.quote,
                source_chain: Vec::new(),
                errors: Vec::new(),
                from_cache: true,
                stale: false,
                latency_ms: elapsed_ms(started),
            });
        }

        let mut source_chain = Vec::new();
        let mut errors = Vec::new();

        for source in self.sources(category) {
            let provider = source.id();
            if !source.is_configured() {
                debug!(category = %category, provider = %provider, "skipping unconfigured provider");
                continue;
            }

            source_chain.push(provider);
            match source.fetch().await {
                Ok(quote) if quote.category() == category => {
                    ctx.cache.put(quote.clone()).await;
                    ctx.status.record(category, ProviderStatus::Serving(provider));
                    let latency_ms = elapsed_ms(started);
                    info!(
                        category = %category,
                        provider = %provider,
                        attempts = source_chain.len(),
                        latency_ms,
                        "category resolved"
                    );
                    return Ok(Resolved {
                        quote,
                        selected_source: provider,
                        source_chain,
                        errors,
                        from_cache: false,
                        stale: false,
                        latency_ms,
                    });
                }
                Ok(quote) => {
                    let error = SourceError::internal(format!(
                        "{provider} answered {} for a {category} request",
                        quote.category()
                    ));
                    warn!(category = %category, provider = %provider, code = error.code(), "provider failed");
                    errors.push(ProviderFailure { provider, error });
                }
                Err(error) => {
                    warn!(
                        category = %category,
                        provider = %provider,
                        code = error.code(),
                        error = %error.message(),
                        "provider failed"
                    );
                    errors.push(ProviderFailure { provider, error });
                }
            }
        }

        ctx.status.record(category, ProviderStatus::Failed);

        if self.stale_fallback == StaleFallback::ReuseStale {
            if let Some(entry) = ctx.cache.entry(category).await {
                warn!(
                    category = %category,
                    provider = %entry.quote.provider(),
                    age_ms = entry.age().as_millis() as u64,
                    "all providers failed; serving stale entry"
                );
                return Ok(Resolved {
                    selected_source: entry.quote.provider(),
                    quote: entry.quote,
                    source_chain,
                    errors,
                    from_cache: true,
                    stale: true,
                    latency_ms: elapsed_ms(started),
                });
            }
        }

        warn!(
            category = %category,
            attempts = source_chain.len(),
            "category resolution failed"
        );
        Err(ResolutionFailure {
            category,
            source_chain,
            errors,
            latency_ms: elapsed_ms(started),
        })
    }
}

impl std::fmt::Debug for SourceResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let chains = Category::ALL
            .into_iter()
            .map(|category| (category, self.chain(category)))
            .collect::<Vec<_>>();
        f.debug_struct("SourceResolver")
            .field("chains", &chains)
            .field("stale_fallback", &self.stale_fallback)
            .finish()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Builds a [`SourceResolver`] over the default provider catalogue.
///
/// # Example
///
/// ```rust,ignore
/// use aurex_core::{MonitorConfig, SourceResolverBuilder};
///
/// let resolver = SourceResolverBuilder::from_config(&MonitorConfig::default()).build();
/// ```
#[derive(Default)]
pub struct SourceResolverBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    goldapi_key: Option<String>,
    disabled: BTreeSet<ProviderId>,
    timeout_ms: Option<u64>,
    stale_fallback: StaleFallback,
}

impl SourceResolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            http_client: None,
            goldapi_key: config.providers.goldapi_key.clone(),
            disabled: config.providers.disabled.iter().copied().collect(),
            timeout_ms: Some(config.request_timeout_ms),
            stale_fallback: config.stale_fallback,
        }
    }

    /// Transport for every provider; defaults to [`ReqwestHttpClient`].
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_goldapi_key(mut self, key: impl Into<String>) -> Self {
        self.goldapi_key = Some(key.into());
        self
    }

    pub fn with_provider_disabled(mut self, provider: ProviderId) -> Self {
        self.disabled.insert(provider);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_stale_fallback(mut self, stale_fallback: StaleFallback) -> Self {
        self.stale_fallback = stale_fallback;
        self
    }

    pub fn build(self) -> SourceResolver {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let sources = default_sources(
            http_client,
            self.goldapi_key,
            self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        )
        .into_iter()
        .filter(|source| !self.disabled.contains(&source.id()))
        .collect();

        SourceResolver::new(sources).with_stale_fallback(self.stale_fallback)
    }
}
