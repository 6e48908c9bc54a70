use serde_json::Value;

use super::{endpoint_url, rates_quote, reject_flagged_failure, ProviderTransport};
use crate::data_source::{FetchFuture, QuoteSource};
use crate::ProviderId;

/// open.er-api.com v6: `{"result":"success","base_code":"USD","rates":{..}}`.
#[derive(Debug, Clone)]
pub struct OpenErApiAdapter {
    transport: ProviderTransport,
    url: String,
}

impl OpenErApiAdapter {
    pub fn new(transport: ProviderTransport) -> Self {
        Self {
            transport,
            url: endpoint_url(ProviderId::OpenErApi),
        }
    }
}

impl QuoteSource for OpenErApiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OpenErApi
    }

    fn fetch<'a>(&'a self) -> FetchFuture<'a> {
        Box::pin(async move {
            let body = self.transport.get_json(&self.url).await?;
            reject_flagged_failure(self.id(), &body)?;
            let base = body
                .get("base_code")
                .and_then(Value::as_str)
                .unwrap_or("USD");
            rates_quote(self.id(), base, body.get("rates"))
        })
    }
}
