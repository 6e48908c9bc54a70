use serde_json::Value;

use super::{endpoint_url, rates_quote, ProviderTransport};
use crate::data_source::{FetchFuture, QuoteSource};
use crate::ProviderId;

/// exchangerate-api.com v4: `{"base":"USD","rates":{..}}`.
#[derive(Debug, Clone)]
pub struct ExchangeRateApiAdapter {
    transport: ProviderTransport,
    url: String,
}

impl ExchangeRateApiAdapter {
    pub fn new(transport: ProviderTransport) -> Self {
        Self {
            transport,
            url: endpoint_url(ProviderId::ExchangeRateApi),
        }
    }
}

impl QuoteSource for ExchangeRateApiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::ExchangeRateApi
    }

    fn fetch<'a>(&'a self) -> FetchFuture<'a> {
        Box::pin(async move {
            let body = self.transport.get_json(&self.url).await?;
            let base = body.get("base").and_then(Value::as_str).unwrap_or("USD");
            rates_quote(self.id(), base, body.get("rates"))
        })
    }
}
