use serde_json::Value;

use super::{endpoint_url, rates_quote, reject_flagged_failure, spot_quote, ProviderTransport};
use crate::data_source::{FetchFuture, QuoteSource};
use crate::ProviderId;

/// fxratesapi.com with `base=USD`: last exchange-rate fallback.
#[derive(Debug, Clone)]
pub struct FxRatesApiAdapter {
    transport: ProviderTransport,
    url: String,
}

impl FxRatesApiAdapter {
    pub fn new(transport: ProviderTransport) -> Self {
        Self {
            transport,
            url: endpoint_url(ProviderId::FxRatesApi),
        }
    }
}

impl QuoteSource for FxRatesApiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::FxRatesApi
    }

    fn fetch<'a>(&'a self) -> FetchFuture<'a> {
        Box::pin(async move {
            let body = self.transport.get_json(&self.url).await?;
            reject_flagged_failure(self.id(), &body)?;
            let base = body.get("base").and_then(Value::as_str).unwrap_or("USD");
            rates_quote(self.id(), base, body.get("rates"))
        })
    }
}

/// fxratesapi.com with `base=XAU&symbols=USD`: spot gold as a rate map.
#[derive(Debug, Clone)]
pub struct FxRatesApiGoldAdapter {
    transport: ProviderTransport,
    url: String,
}

impl FxRatesApiGoldAdapter {
    pub fn new(transport: ProviderTransport) -> Self {
        Self {
            transport,
            url: endpoint_url(ProviderId::FxRatesApiGold),
        }
    }
}

impl QuoteSource for FxRatesApiGoldAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::FxRatesApiGold
    }

    fn fetch<'a>(&'a self) -> FetchFuture<'a> {
        Box::pin(async move {
            let body = self.transport.get_json(&self.url).await?;
            reject_flagged_failure(self.id(), &body)?;
            spot_quote(self.id(), &body)
        })
    }
}
