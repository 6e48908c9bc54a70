use super::{endpoint_url, reject_flagged_failure, spot_quote, ProviderTransport};
use crate::data_source::{FetchFuture, QuoteSource};
use crate::ProviderId;

/// exchangerate.host with `base=XAU&symbols=USD`.
#[derive(Debug, Clone)]
pub struct ExchangeRateHostAdapter {
    transport: ProviderTransport,
    url: String,
}

impl ExchangeRateHostAdapter {
    pub fn new(transport: ProviderTransport) -> Self {
        Self {
            transport,
            url: endpoint_url(ProviderId::ExchangeRateHost),
        }
    }
}

impl QuoteSource for ExchangeRateHostAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::ExchangeRateHost
    }

    fn fetch<'a>(&'a self) -> FetchFuture<'a> {
        Box::pin(async move {
            let body = self.transport.get_json(&self.url).await?;
            reject_flagged_failure(self.id(), &body)?;
            spot_quote(self.id(), &body)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::test_support::block_on;
    use crate::http_client::FixtureHttpClient;

    #[test]
    fn inverts_per_dollar_xau_rate() {
        let client = Arc::new(FixtureHttpClient::new().with_json(
            endpoint_url(ProviderId::ExchangeRateHost),
            r#"{"base":"USD","rates":{"XAU":0.0004}}"#,
        ));
        let adapter =
            ExchangeRateHostAdapter::new(ProviderTransport::new(ProviderId::ExchangeRateHost, client));

        let quote = block_on(adapter.fetch()).expect("payload parses");
        let spot = quote.spot_usd().expect("spot payload");
        assert!((spot - 2_500.0).abs() < 1e-9);
    }
}
