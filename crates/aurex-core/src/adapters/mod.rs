//! Upstream provider clients.
//!
//! Each adapter owns one endpoint and one normalization function. Shared
//! plumbing (rate budget, status checks, JSON decoding) lives in
//! [`ProviderTransport`]; shape-specific lookups live here.

mod exchange_rate_api;
mod exchange_rate_host;
mod fx_rates_api;
mod gold_api;
mod metals_live;
mod open_er_api;
mod transport;

use std::sync::Arc;

use serde_json::Value;

pub use exchange_rate_api::ExchangeRateApiAdapter;
pub use exchange_rate_host::ExchangeRateHostAdapter;
pub use fx_rates_api::{FxRatesApiAdapter, FxRatesApiGoldAdapter};
pub use gold_api::GoldApiAdapter;
pub use metals_live::MetalsLiveAdapter;
pub use open_er_api::OpenErApiAdapter;
pub use transport::ProviderTransport;

use crate::data_source::{QuoteSource, SourceError};
use crate::http_client::HttpClient;
use crate::{ProviderId, RawQuote};

/// Resolved request URL for a provider.
pub fn endpoint_url(provider: ProviderId) -> String {
    match provider {
        ProviderId::ExchangeRateApi => String::from("https://api.exchangerate-api.com/v4/latest/USD"),
        ProviderId::OpenErApi => String::from("https://open.er-api.com/v6/latest/USD"),
        ProviderId::FxRatesApi => query_url("https://api.fxratesapi.com/latest", &[("base", "USD")]),
        ProviderId::MetalsLive => String::from("https://api.metals.live/v1/spot/gold"),
        ProviderId::ExchangeRateHost => query_url(
            "https://api.exchangerate.host/latest",
            &[("base", "XAU"), ("symbols", "USD")],
        ),
        ProviderId::FxRatesApiGold => query_url(
            "https://api.fxratesapi.com/latest",
            &[("base", "XAU"), ("symbols", "USD")],
        ),
        ProviderId::GoldApi => String::from("https://www.goldapi.io/api/XAU/USD"),
    }
}

/// Builds one client per provider, in catalogue order.
pub fn default_sources(
    http_client: Arc<dyn HttpClient>,
    goldapi_key: Option<String>,
    timeout_ms: u64,
) -> Vec<Arc<dyn QuoteSource>> {
    ProviderId::ALL
        .into_iter()
        .map(|provider| {
            let transport = ProviderTransport::new(provider, Arc::clone(&http_client))
                .with_timeout_ms(timeout_ms);
            let source: Arc<dyn QuoteSource> = match provider {
                ProviderId::ExchangeRateApi => Arc::new(ExchangeRateApiAdapter::new(transport)),
                ProviderId::OpenErApi => Arc::new(OpenErApiAdapter::new(transport)),
                ProviderId::FxRatesApi => Arc::new(FxRatesApiAdapter::new(transport)),
                ProviderId::MetalsLive => Arc::new(MetalsLiveAdapter::new(transport)),
                ProviderId::ExchangeRateHost => Arc::new(ExchangeRateHostAdapter::new(transport)),
                ProviderId::FxRatesApiGold => Arc::new(FxRatesApiGoldAdapter::new(transport)),
                ProviderId::GoldApi => Arc::new(GoldApiAdapter::new(transport, goldapi_key.clone())),
            };
            source
        })
        .collect()
}

fn query_url(base: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

/// Reads a number that may arrive as a JSON number or a numeric string.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Normalizes a `rates` object into a USD-based rate quote.
fn rates_quote(provider: ProviderId, base: &str, rates: Option<&Value>) -> Result<RawQuote, SourceError> {
    let Some(Value::Object(map)) = rates else {
        return Err(SourceError::parse(format!(
            "{provider} response is missing a rates object"
        )));
    };

    let entries = map
        .iter()
        .filter_map(|(code, value)| numeric(value).map(|rate| (code.clone(), rate)));
    RawQuote::rates(provider, base, entries).map_err(|error| {
        SourceError::parse(format!("{provider} returned no usable rates: {error}"))
    })
}

/// Finds spot gold in USD per ounce.
///
/// Lookup order: `price`, `gold`, `rates.USD` (quote base XAU), then
/// `1 / rates.XAU`. Arrays are searched element by element.
fn spot_usd(value: &Value) -> Option<f64> {
    if let Value::Array(items) = value {
        return items.iter().find_map(spot_usd);
    }

    let direct = value
        .get("price")
        .and_then(numeric)
        .or_else(|| value.get("gold").and_then(numeric));
    if direct.is_some() {
        return direct;
    }

    let rates = value.get("rates")?;
    rates.get("USD").and_then(numeric).or_else(|| {
        rates
            .get("XAU")
            .and_then(numeric)
            .filter(|per_dollar| *per_dollar != 0.0)
            .map(|per_dollar| 1.0 / per_dollar)
    })
}

fn spot_quote(provider: ProviderId, body: &Value) -> Result<RawQuote, SourceError> {
    let spot = spot_usd(body).ok_or_else(|| {
        SourceError::parse(format!("{provider} response carries no gold spot field"))
    })?;
    RawQuote::spot(provider, spot)
        .map_err(|error| SourceError::parse(format!("{provider} returned an unusable spot: {error}")))
}

/// Upstreams that report failure in a 200 body.
fn reject_flagged_failure(provider: ProviderId, body: &Value) -> Result<(), SourceError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(SourceError::parse(format!(
            "{provider} reported success=false"
        )));
    }
    if let Some(result) = body.get("result").and_then(Value::as_str) {
        if result != "success" {
            return Err(SourceError::parse(format!(
                "{provider} reported result={result}"
            )));
        }
    }
    Ok(())
}
