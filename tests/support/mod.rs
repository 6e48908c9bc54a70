//! Fixtures shared by the behaviour tests.
#![allow(dead_code)]

use std::sync::Arc;

use aurex_core::adapters::endpoint_url;
use aurex_core::{
    FixtureHttpClient, HttpClient, HttpResponse, MonitorConfig, PriceMonitor, ProviderId,
    SourceResolver, SourceResolverBuilder,
};

pub const FOREX_BODY: &str =
    r#"{"base":"USD","rates":{"USD":1,"CNY":7.20,"CHF":0.90,"JPY":150.0}}"#;
pub const OPEN_ER_BODY: &str =
    r#"{"result":"success","base_code":"USD","rates":{"USD":1,"CNY":7.20,"CHF":0.90,"JPY":150.0}}"#;
pub const GOLD_BODY: &str = r#"{"gold":2000.0}"#;

pub const FOREX_PROVIDERS: [ProviderId; 3] = [
    ProviderId::ExchangeRateApi,
    ProviderId::OpenErApi,
    ProviderId::FxRatesApi,
];
pub const GOLD_PROVIDERS: [ProviderId; 3] = [
    ProviderId::MetalsLive,
    ProviderId::ExchangeRateHost,
    ProviderId::FxRatesApiGold,
];

/// First provider of each category answers; nothing else is routed.
pub fn healthy_client() -> Arc<FixtureHttpClient> {
    Arc::new(
        FixtureHttpClient::new()
            .with_json(endpoint_url(ProviderId::ExchangeRateApi), FOREX_BODY)
            .with_json(endpoint_url(ProviderId::MetalsLive), GOLD_BODY),
    )
}

/// Every keyless provider answers 503.
pub fn failing_client() -> Arc<FixtureHttpClient> {
    let client = FixtureHttpClient::new();
    fail_all(&client);
    Arc::new(client)
}

pub fn fail_all(client: &FixtureHttpClient) {
    for provider in FOREX_PROVIDERS.into_iter().chain(GOLD_PROVIDERS) {
        client.set_response(
            endpoint_url(provider),
            HttpResponse::with_status(503, "unavailable"),
        );
    }
}

pub fn restore_primaries(client: &FixtureHttpClient) {
    client.set_response(
        endpoint_url(ProviderId::ExchangeRateApi),
        HttpResponse::ok_json(FOREX_BODY),
    );
    client.set_response(
        endpoint_url(ProviderId::MetalsLive),
        HttpResponse::ok_json(GOLD_BODY),
    );
}

/// Monitor settings without the inter-item pause.
pub fn quiet_config() -> MonitorConfig {
    MonitorConfig {
        item_pause_ms: 0,
        ..MonitorConfig::default()
    }
}

pub fn resolver_over(client: &Arc<FixtureHttpClient>, config: &MonitorConfig) -> SourceResolver {
    SourceResolverBuilder::from_config(config)
        .with_http_client(Arc::clone(client) as Arc<dyn HttpClient>)
        .build()
}

pub fn monitor_over(client: &Arc<FixtureHttpClient>) -> PriceMonitor {
    monitor_with(client, &quiet_config())
}

pub fn monitor_with(client: &Arc<FixtureHttpClient>, config: &MonitorConfig) -> PriceMonitor {
    PriceMonitor::new(resolver_over(client, config), config)
}

pub fn forex_url() -> String {
    endpoint_url(ProviderId::ExchangeRateApi)
}

pub fn gold_url() -> String {
    endpoint_url(ProviderId::MetalsLive)
}
