use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::debug;

use crate::data_source::SourceError;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::RateBudget;
use crate::ProviderId;

/// One-shot GET plumbing shared by every adapter.
///
/// Checks the provider's rate budget, issues exactly one request and maps
/// transport, status and decoding failures onto [`SourceError`].
#[derive(Clone)]
pub struct ProviderTransport {
    provider: ProviderId,
    http_client: Arc<dyn HttpClient>,
    budget: RateBudget,
    auth: HttpAuth,
    timeout_ms: u64,
}

impl ProviderTransport {
    pub fn new(provider: ProviderId, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            provider,
            http_client,
            budget: RateBudget::from_policy(&ProviderPolicy::default_for(provider)),
            auth: HttpAuth::None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_policy(mut self, policy: &ProviderPolicy) -> Self {
        self.budget = RateBudget::from_policy(policy);
        self
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        if !self.budget.try_acquire() {
            return Err(SourceError::rate_limited(format!(
                "{} request budget of {} per window is exhausted",
                self.provider,
                self.budget.quota_limit()
            )));
        }

        let started = Instant::now();
        let request = HttpRequest::get(url)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);
        let response = self.http_client.execute(request).await.map_err(|error| {
            SourceError::transport(format!(
                "{} transport error: {}",
                self.provider,
                error.message()
            ))
        })?;

        debug!(
            provider = %self.provider,
            status = response.status,
            latency_ms = started.elapsed().as_millis() as u64,
            "upstream responded"
        );

        if !response.is_success() {
            return Err(SourceError::status(response.status));
        }

        serde_json::from_str(&response.body).map_err(|error| {
            SourceError::parse(format!("{} returned invalid JSON: {error}", self.provider))
        })
    }
}

impl std::fmt::Debug for ProviderTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderTransport")
            .field("provider", &self.provider)
            .field("auth", &self.auth)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}
