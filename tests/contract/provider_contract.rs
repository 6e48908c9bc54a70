//! Contract tests shared by every provider adapter.
//!
//! Each adapter performs exactly one GET against its endpoint, normalizes the
//! upstream shape into a `RawQuote` for its own category, and reports
//! failures as structured `SourceError`s without retrying.

use std::sync::Arc;

use aurex_core::adapters::endpoint_url;
use aurex_core::{
    default_sources, Category, FixtureHttpClient, HttpResponse, ProviderId, QuotePayload,
    QuoteSource, SourceErrorKind,
};

const GOLDAPI_KEY: &str = "test-goldapi-key";

fn healthy_body(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::ExchangeRateApi => {
            r#"{"base":"USD","date":"2024-05-01","rates":{"USD":1,"CNY":7.24,"CHF":0.91,"JPY":156.3}}"#
        }
        ProviderId::OpenErApi => {
            r#"{"result":"success","base_code":"USD","rates":{"USD":1,"CNY":7.24,"CHF":0.91,"JPY":156.3}}"#
        }
        ProviderId::FxRatesApi => {
            r#"{"success":true,"base":"USD","rates":{"CNY":7.24,"CHF":0.91,"JPY":156.3}}"#
        }
        ProviderId::MetalsLive => r#"[{"gold":2331.4}]"#,
        ProviderId::ExchangeRateHost => r#"{"success":true,"base":"XAU","rates":{"USD":2331.4}}"#,
        ProviderId::FxRatesApiGold => r#"{"success":true,"base":"XAU","rates":{"USD":2331.4}}"#,
        ProviderId::GoldApi => r#"{"metal":"XAU","currency":"USD","price":2331.4}"#,
    }
}

fn sources_over(client: &Arc<FixtureHttpClient>) -> Vec<Arc<dyn QuoteSource>> {
    default_sources(
        Arc::clone(client) as Arc<dyn aurex_core::HttpClient>,
        Some(GOLDAPI_KEY.to_owned()),
        2_000,
    )
}

fn healthy_client() -> Arc<FixtureHttpClient> {
    let client = FixtureHttpClient::new();
    for provider in ProviderId::ALL {
        client.set_response(
            endpoint_url(provider),
            HttpResponse::ok_json(healthy_body(provider)),
        );
    }
    Arc::new(client)
}

// =============================================================================
// Contract: successful fetches
// =============================================================================

#[tokio::test]
async fn every_provider_normalizes_its_payload_into_its_category() {
    let client = healthy_client();

    for source in sources_over(&client) {
        let provider = source.id();
        let quote = source
            .fetch()
            .await
            .unwrap_or_else(|error| panic!("provider '{provider}' fetch failed: {error}"));

        assert_eq!(quote.provider(), provider, "provider '{provider}': tag");
        assert_eq!(
            quote.category(),
            provider.category(),
            "provider '{provider}': category"
        );

        match quote.category() {
            Category::ExchangeRates => {
                assert_eq!(quote.rate("CNY"), Some(7.24), "provider '{provider}': CNY");
                assert_eq!(quote.rate("CHF"), Some(0.91), "provider '{provider}': CHF");
                assert_eq!(quote.rate("JPY"), Some(156.3), "provider '{provider}': JPY");
            }
            Category::GoldSpot => {
                assert_eq!(quote.spot_usd(), Some(2331.4), "provider '{provider}': spot");
                assert!(matches!(quote.payload(), QuotePayload::Spot { .. }));
            }
        }
    }
}

#[tokio::test]
async fn every_provider_issues_exactly_one_request_per_fetch() {
    let client = healthy_client();

    for source in sources_over(&client) {
        let url = endpoint_url(source.id());
        source.fetch().await.expect("healthy fixture");
        assert_eq!(
            client.request_count_for(&url),
            1,
            "provider '{}': request count",
            source.id()
        );
    }
}

#[tokio::test]
async fn only_goldapi_sends_credentials() {
    let client = healthy_client();

    for source in sources_over(&client) {
        source.fetch().await.expect("healthy fixture");
    }

    for request in client.requests() {
        let token = request.headers.get("x-access-token");
        if request.url == endpoint_url(ProviderId::GoldApi) {
            assert_eq!(token.map(String::as_str), Some(GOLDAPI_KEY));
        } else {
            assert!(request.headers.is_empty(), "{} sent headers", request.url);
        }
    }
}

// =============================================================================
// Contract: failures are reported, never retried
// =============================================================================

#[tokio::test]
async fn server_errors_surface_as_status_failures() {
    let client = FixtureHttpClient::new();
    for provider in ProviderId::ALL {
        client.set_response(
            endpoint_url(provider),
            HttpResponse::with_status(503, "upstream unavailable"),
        );
    }
    let client = Arc::new(client);

    for source in sources_over(&client) {
        let error = source.fetch().await.expect_err("503 must fail");
        assert_eq!(error.kind(), SourceErrorKind::Status, "provider '{}'", source.id());
        assert_eq!(error.code(), "source.status");
        assert_eq!(client.request_count_for(&endpoint_url(source.id())), 1);
    }
}

#[tokio::test]
async fn unparseable_bodies_surface_as_parse_failures() {
    let client = FixtureHttpClient::new();
    for provider in ProviderId::ALL {
        client.set_response(endpoint_url(provider), HttpResponse::ok_json("<html>"));
    }
    let client = Arc::new(client);

    for source in sources_over(&client) {
        let error = source.fetch().await.expect_err("html must fail");
        assert_eq!(error.kind(), SourceErrorKind::Parse, "provider '{}'", source.id());
    }
}

#[tokio::test]
async fn network_errors_surface_as_transport_failures() {
    let client = Arc::new(FixtureHttpClient::new());

    for source in sources_over(&client) {
        let error = source.fetch().await.expect_err("no fixture means no network");
        assert_eq!(
            error.kind(),
            SourceErrorKind::Transport,
            "provider '{}'",
            source.id()
        );
    }
}

#[tokio::test]
async fn flagged_failures_in_successful_responses_are_rejected() {
    let client = FixtureHttpClient::new()
        .with_json(
            endpoint_url(ProviderId::OpenErApi),
            r#"{"result":"error","error-type":"quota-reached"}"#,
        )
        .with_json(
            endpoint_url(ProviderId::FxRatesApi),
            r#"{"success":false,"error":"invalid_base"}"#,
        );
    let client = Arc::new(client);

    for source in sources_over(&client) {
        if matches!(source.id(), ProviderId::OpenErApi | ProviderId::FxRatesApi) {
            let error = source.fetch().await.expect_err("flagged failure");
            assert_eq!(error.kind(), SourceErrorKind::Parse);
        }
    }
}

#[tokio::test]
async fn goldapi_without_key_is_unconfigured_and_never_calls_out() {
    let client = healthy_client();
    let sources = default_sources(
        Arc::clone(&client) as Arc<dyn aurex_core::HttpClient>,
        None,
        2_000,
    );

    let goldapi = sources
        .iter()
        .find(|source| source.id() == ProviderId::GoldApi)
        .expect("goldapi is in the catalogue");
    assert!(!goldapi.is_configured());

    let error = goldapi.fetch().await.expect_err("no key");
    assert_eq!(error.kind(), SourceErrorKind::CredentialsMissing);
    assert_eq!(client.request_count(), 0);

    assert!(sources
        .iter()
        .filter(|source| source.id() != ProviderId::GoldApi)
        .all(|source| source.is_configured()));
}
