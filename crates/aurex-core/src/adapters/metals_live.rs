use super::{endpoint_url, spot_quote, ProviderTransport};
use crate::data_source::{FetchFuture, QuoteSource};
use crate::ProviderId;

/// metals.live spot endpoint; answers an object or an array of objects.
#[derive(Debug, Clone)]
pub struct MetalsLiveAdapter {
    transport: ProviderTransport,
    url: String,
}

impl MetalsLiveAdapter {
    pub fn new(transport: ProviderTransport) -> Self {
        Self {
            transport,
            url: endpoint_url(ProviderId::MetalsLive),
        }
    }
}

impl QuoteSource for MetalsLiveAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::MetalsLive
    }

    fn fetch<'a>(&'a self) -> FetchFuture<'a> {
        Box::pin(async move {
            let body = self.transport.get_json(&self.url).await?;
            spot_quote(self.id(), &body)
        })
    }
}
