use std::time::Duration;

use crate::ProviderId;

/// Request budget for one upstream provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub quota_window: Duration,
    pub quota_limit: u32,
}

impl ProviderPolicy {
    /// Public keyless endpoints: 30 requests per minute.
    pub fn public_default(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            quota_window: Duration::from_secs(60),
            quota_limit: 30,
        }
    }

    /// goldapi.io free tier is metered per account, so stay well below it.
    pub fn goldapi_default() -> Self {
        Self {
            provider_id: ProviderId::GoldApi,
            quota_window: Duration::from_secs(60),
            quota_limit: 5,
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::GoldApi => Self::goldapi_default(),
            other => Self::public_default(other),
        }
    }
}
