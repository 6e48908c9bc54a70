//! Behaviour tests for refresh cycles, the degradation policy and the
//! refresh scheduler.

mod support;

use std::sync::Arc;
use std::time::Duration;

use aurex_core::adapters::endpoint_url;
use aurex_core::{
    Category, DataMode, HttpResponse, InstrumentId, MonitorConfig, MonitorEvent, ProviderId,
    ProviderStatus, RecordOrigin, RefreshScheduler,
};
use tokio::sync::broadcast::{self, error::TryRecvError};

use support::{
    fail_all, failing_client, forex_url, gold_url, healthy_client, monitor_over, monitor_with,
    quiet_config, restore_primaries, GOLD_PROVIDERS,
};

fn drain(events: &mut broadcast::Receiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut drained = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => drained.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return drained,
        }
    }
}

fn completed_cycles(events: &mut broadcast::Receiver<MonitorEvent>) -> usize {
    drain(events)
        .iter()
        .filter(|event| matches!(event, MonitorEvent::CycleCompleted { .. }))
        .count()
}

async fn next_cycle(events: &mut broadcast::Receiver<MonitorEvent>) {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(MonitorEvent::CycleCompleted { .. }) => return,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event stream closed"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(2), wait)
        .await
        .expect("a refresh cycle completes");
}

// =============================================================================
// Startup probe
// =============================================================================

#[tokio::test]
async fn when_probe_succeeds_system_goes_live_with_exact_conversions() {
    // Given: healthy primaries serving CNY 7.20, CHF 0.90, JPY 150, gold 2000
    let client = healthy_client();
    let monitor = monitor_over(&client);
    let mut events = monitor.subscribe();
    assert_eq!(monitor.mode(), DataMode::Connecting);

    // When
    let report = monitor.start().await;

    // Then: live mode and the documented conversions
    assert_eq!(report.mode, DataMode::Live);
    assert_eq!(monitor.mode(), DataMode::Live);
    assert_eq!(report.records.len(), 4);
    assert!(report.failures.is_empty());
    assert!(report
        .records
        .iter()
        .all(|record| record.origin == RecordOrigin::Live && !record.degraded));

    let price = |id: InstrumentId| monitor.record(id).expect("record present").price;
    assert!((price(InstrumentId::Xau) - 2000.0 * 7.20 / 31.1035).abs() < 1e-9);
    assert!((price(InstrumentId::Usd) - 7.20).abs() < 1e-12);
    assert!((price(InstrumentId::Chf) - 8.00).abs() < 1e-12);
    assert!((price(InstrumentId::Jpy) - 4.80).abs() < 1e-12);

    // And: status, timestamp and events are observable
    assert_eq!(monitor.status_label(Category::ExchangeRates), "ExchangeRate-API");
    assert_eq!(monitor.status_label(Category::GoldSpot), "Metals.live");
    assert!(monitor.last_update().is_some());

    let events = drain(&mut events);
    assert!(events.contains(&MonitorEvent::ModeChanged {
        mode: DataMode::Live
    }));
    assert!(events.contains(&MonitorEvent::StatusChanged {
        category: Category::GoldSpot,
        status: ProviderStatus::Serving(ProviderId::MetalsLive),
    }));
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, MonitorEvent::RecordUpdated { .. }))
            .count(),
        4
    );
    assert!(matches!(
        events.last(),
        Some(MonitorEvent::CycleCompleted {
            records: 4,
            failures: 0,
            ..
        })
    ));
}

#[tokio::test]
async fn when_probe_fails_system_stays_synthetic_without_further_requests() {
    // Given: every provider is down
    let client = failing_client();
    let monitor = monitor_over(&client);

    // When: startup and two more periodic cycles
    let report = monitor.start().await;
    let requests_after_probe = client.request_count();
    monitor.refresh().await;
    monitor.try_refresh().await.expect("no cycle in flight");

    // Then: synthetic for every instrument, and no more network traffic
    assert_eq!(report.mode, DataMode::Synthetic);
    assert_eq!(monitor.mode(), DataMode::Synthetic);
    assert_eq!(monitor.mode().label(), "synthetic data");
    assert!(monitor.records().iter().all(|record| record.is_synthetic()));
    assert_eq!(client.request_count(), requests_after_probe);
    assert_eq!(monitor.status_label(Category::ExchangeRates), "fetch failed");
    assert_eq!(monitor.status_label(Category::GoldSpot), "fetch failed");
}

#[tokio::test]
async fn when_only_gold_fails_probe_system_still_goes_synthetic() {
    let client = healthy_client();
    client.set_response(gold_url(), HttpResponse::with_status(500, "down"));
    let monitor = monitor_over(&client);

    let report = monitor.start().await;

    assert_eq!(report.mode, DataMode::Synthetic);
    assert_eq!(monitor.provider_status(Category::GoldSpot), ProviderStatus::Failed);
    assert_eq!(
        monitor.provider_status(Category::ExchangeRates),
        ProviderStatus::Serving(ProviderId::ExchangeRateApi)
    );
}

// =============================================================================
// Manual refresh
// =============================================================================

#[tokio::test]
async fn when_manual_refresh_runs_within_ttl_system_fetches_again() {
    // Given: a live monitor with a fresh cache
    let client = healthy_client();
    let monitor = monitor_over(&client);
    monitor.start().await;
    assert_eq!(client.request_count_for(&forex_url()), 1);
    assert_eq!(client.request_count_for(&gold_url()), 1);

    // When: a periodic refresh inside the TTL
    monitor.refresh().await;

    // Then: the cache answers
    assert_eq!(client.request_count(), 2);

    // When: a manual refresh inside the TTL
    let report = monitor.manual_refresh().await;

    // Then: both categories are fetched again
    assert_eq!(report.mode, DataMode::Live);
    assert_eq!(client.request_count_for(&forex_url()), 2);
    assert_eq!(client.request_count_for(&gold_url()), 2);
}

#[tokio::test]
async fn when_providers_recover_manual_refresh_returns_to_live() {
    // Given: synthetic after a failed startup probe
    let client = failing_client();
    let monitor = monitor_over(&client);
    monitor.start().await;
    assert_eq!(monitor.mode(), DataMode::Synthetic);

    // When: the primaries come back and the user refreshes
    restore_primaries(&client);
    let mut events = monitor.subscribe();
    let report = monitor.manual_refresh().await;

    // Then
    assert_eq!(report.mode, DataMode::Live);
    assert!(report.records.iter().all(|record| !record.is_synthetic()));
    assert!(drain(&mut events).contains(&MonitorEvent::ModeChanged {
        mode: DataMode::Live
    }));
}

// =============================================================================
// Overlapping cycles
// =============================================================================

#[tokio::test]
async fn when_a_cycle_is_in_flight_periodic_refresh_is_skipped() {
    // Given: a live monitor whose cycles pause between instruments
    let client = healthy_client();
    let config = MonitorConfig {
        item_pause_ms: 50,
        ..quiet_config()
    };
    let monitor = Arc::new(monitor_with(&client, &config));
    monitor.start().await;
    assert_eq!(client.request_count(), 2);

    // When: a periodic tick arrives while another cycle is running
    let in_flight = tokio::spawn({
        let monitor = Arc::clone(&monitor);
        async move { monitor.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    let skipped = monitor.try_refresh().await;

    // Then: the tick is coalesced into the running cycle
    assert!(skipped.is_none());

    // When: a manual refresh arrives while the cycle is still running
    let report = monitor.manual_refresh().await;

    // Then: it waited for that cycle, then cleared the cache and fetched again
    let first = in_flight.await.expect("in-flight cycle completes");
    assert!(first.updated_at <= report.updated_at);
    assert_eq!(report.records.len(), 4);
    assert_eq!(client.request_count(), 4);
}

// =============================================================================
// Per-instrument fallback
// =============================================================================

#[tokio::test]
async fn when_gold_fails_mid_session_only_gold_turns_synthetic() {
    // Given: a live session
    let client = healthy_client();
    let monitor = monitor_over(&client);
    monitor.start().await;

    // When: every gold provider fails and the cache is cleared
    for provider in GOLD_PROVIDERS {
        client.set_response(
            endpoint_url(provider),
            HttpResponse::with_status(502, "bad gateway"),
        );
    }
    let mut events = monitor.subscribe();
    let report = monitor.manual_refresh().await;

    // Then: gold is synthetic with an inline marker, the rest stays live
    assert_eq!(report.mode, DataMode::Live);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].instrument, InstrumentId::Xau);

    let gold = monitor.record(InstrumentId::Xau).expect("gold record");
    assert!(gold.is_synthetic());
    let marker = monitor.failure(InstrumentId::Xau).expect("gold marker");
    assert!(marker.contains("all providers failed"));
    for id in [InstrumentId::Usd, InstrumentId::Chf, InstrumentId::Jpy] {
        assert_eq!(
            monitor.record(id).expect("record").origin,
            RecordOrigin::Live
        );
        assert!(monitor.failure(id).is_none());
    }
    assert_eq!(monitor.status_label(Category::GoldSpot), "fetch failed");

    // And: the failure is announced before the substitute card
    let events = drain(&mut events);
    let failed_at = events
        .iter()
        .position(|event| {
            matches!(
                event,
                MonitorEvent::UpdateFailed {
                    instrument: InstrumentId::Xau,
                    ..
                }
            )
        })
        .expect("update failure event");
    assert!(matches!(
        &events[failed_at + 1],
        MonitorEvent::RecordUpdated { record } if record.instrument == InstrumentId::Xau && record.is_synthetic()
    ));
    assert!(events.contains(&MonitorEvent::StatusChanged {
        category: Category::GoldSpot,
        status: ProviderStatus::Failed,
    }));

    // When: gold recovers
    restore_primaries(&client);
    monitor.manual_refresh().await;

    // Then: the marker is gone
    assert!(!monitor.record(InstrumentId::Xau).expect("gold").is_synthetic());
    assert!(monitor.failure(InstrumentId::Xau).is_none());
}

// =============================================================================
// Offline sessions
// =============================================================================

#[tokio::test]
async fn offline_start_never_touches_the_network() {
    let client = healthy_client();
    let monitor = monitor_over(&client);
    let mut events = monitor.subscribe();

    let report = monitor.start_offline().await;
    monitor.manual_refresh().await;

    assert_eq!(report.mode, DataMode::Synthetic);
    assert_eq!(monitor.mode(), DataMode::Synthetic);
    assert_eq!(client.request_count(), 0);
    assert_eq!(monitor.status_label(Category::ExchangeRates), "unknown");
    assert_eq!(
        drain(&mut events).first(),
        Some(&MonitorEvent::ModeChanged {
            mode: DataMode::Synthetic
        })
    );
}

// =============================================================================
// Refresh scheduler
// =============================================================================

#[tokio::test]
async fn scheduler_refreshes_eagerly_and_pauses_while_hidden_or_offline() {
    // Given: a scheduler with a short interval
    let client = healthy_client();
    let monitor = Arc::new(monitor_over(&client));
    let mut events = monitor.subscribe();
    let scheduler = RefreshScheduler::spawn(Arc::clone(&monitor), Duration::from_millis(50));

    // Then: the first tick probes and goes live
    next_cycle(&mut events).await;
    assert_eq!(monitor.mode(), DataMode::Live);

    // When: the display is hidden
    scheduler.set_visible(false);
    assert!(!scheduler.signals().active());
    tokio::time::sleep(Duration::from_millis(30)).await;
    drain(&mut events);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Then: no cycle runs
    assert!(!drain(&mut events)
        .iter()
        .any(|event| matches!(event, MonitorEvent::CycleCompleted { .. })));

    // When: visible again but offline, then back online
    scheduler.set_online(false);
    scheduler.set_visible(true);
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(!drain(&mut events)
        .iter()
        .any(|event| matches!(event, MonitorEvent::CycleCompleted { .. })));
    scheduler.set_online(true);

    // Then: an eager refresh follows
    next_cycle(&mut events).await;

    // And: manual refresh goes through the scheduler
    let before = client.request_count_for(&forex_url());
    let report = scheduler.manual_refresh().await.expect("scheduler running");
    assert_eq!(report.records.len(), 4);
    assert!(client.request_count_for(&forex_url()) > before);

    scheduler.shutdown().await;
}

#[tokio::test]
async fn scheduler_refreshes_when_hidden_and_shown_before_it_runs() {
    // Given: a long interval, so only a resume can trigger a second cycle
    let client = healthy_client();
    let monitor = Arc::new(monitor_over(&client));
    let mut events = monitor.subscribe();
    let scheduler = RefreshScheduler::spawn(Arc::clone(&monitor), Duration::from_secs(30));
    next_cycle(&mut events).await;

    // When: hidden and shown again without yielding to the scheduler
    scheduler.set_visible(false);
    scheduler.set_visible(true);

    // Then: the resume still refreshes eagerly
    next_cycle(&mut events).await;

    // When: the same happens to connectivity
    scheduler.set_online(false);
    scheduler.set_online(true);

    // Then
    next_cycle(&mut events).await;
    assert!(scheduler.signals().active());

    // And: a signal that does not change state triggers nothing
    scheduler.set_visible(true);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(completed_cycles(&mut events), 0);

    scheduler.shutdown().await;
}

#[tokio::test]
async fn queued_manual_refresh_runs_without_a_waiting_caller() {
    let client = healthy_client();
    let monitor = Arc::new(monitor_over(&client));
    let mut events = monitor.subscribe();
    let scheduler = RefreshScheduler::spawn(Arc::clone(&monitor), Duration::from_secs(30));
    next_cycle(&mut events).await;
    let before = client.request_count_for(&forex_url());

    assert!(scheduler.request_refresh());
    next_cycle(&mut events).await;

    assert!(client.request_count_for(&forex_url()) > before);
    scheduler.shutdown().await;
}

#[tokio::test]
async fn scheduler_keeps_running_when_every_provider_fails() {
    let client = healthy_client();
    fail_all(&client);
    let monitor = Arc::new(monitor_over(&client));
    let mut events = monitor.subscribe();
    let scheduler = RefreshScheduler::spawn(Arc::clone(&monitor), Duration::from_millis(30));

    next_cycle(&mut events).await;
    next_cycle(&mut events).await;

    assert_eq!(monitor.mode(), DataMode::Synthetic);
    assert!(!scheduler.is_finished());
    scheduler.shutdown().await;
}
