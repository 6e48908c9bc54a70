use super::{endpoint_url, spot_quote, ProviderTransport};
use crate::data_source::{FetchFuture, QuoteSource, SourceError};
use crate::http_client::HttpAuth;
use crate::ProviderId;

/// goldapi.io; needs an `x-access-token` and is skipped without one.
#[derive(Debug, Clone)]
pub struct GoldApiAdapter {
    transport: ProviderTransport,
    url: String,
    configured: bool,
}

impl GoldApiAdapter {
    pub fn new(transport: ProviderTransport, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        let configured = api_key.is_some();
        let transport = match api_key {
            Some(key) => transport.with_auth(HttpAuth::Header {
                name: String::from("x-access-token"),
                value: key,
            }),
            None => transport,
        };

        Self {
            transport,
            url: endpoint_url(ProviderId::GoldApi),
            configured,
        }
    }
}

impl QuoteSource for GoldApiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::GoldApi
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn fetch<'a>(&'a self) -> FetchFuture<'a> {
        Box::pin(async move {
            if !self.configured {
                return Err(SourceError::credentials_missing(self.id()));
            }
            let body = self.transport.get_json(&self.url).await?;
            spot_quote(self.id(), &body)
        })
    }
}
