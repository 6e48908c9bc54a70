//! Refresh-cycle coordinator.
//!
//! [`PriceMonitor`] owns the shared [`MonitorContext`], the degradation
//! policy and both generators, and exposes the presentation contract:
//!
//! - push: [`PriceMonitor::subscribe`] yields [`MonitorEvent`]s
//! - pull: latest records, failures, history, mode, provider status, last update
//!
//! Cycles are serialized by an async gate. Synchronous state sits behind a
//! std mutex that is never held across an await point.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use time::Date;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::context::MonitorContext;
use crate::conversion::ConversionEngine;
use crate::data_source::Category;
use crate::policy::{DataMode, DegradationPolicy, ProbeOutcome};
use crate::resolver::{ResolveResult, SourceResolver};
use crate::status::ProviderStatus;
use crate::synthetic::SyntheticGenerator;
use crate::{HistoricalSeries, InstrumentId, Period, PriceRecord, UtcDateTime};

const EVENT_CAPACITY: usize = 64;

/// Push notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    ModeChanged {
        mode: DataMode,
    },
    RecordUpdated {
        record: PriceRecord,
    },
    UpdateFailed {
        instrument: InstrumentId,
        message: String,
    },
    CycleCompleted {
        updated_at: UtcDateTime,
        records: usize,
        failures: usize,
    },
    StatusChanged {
        category: Category,
        status: ProviderStatus,
    },
}

/// Instrument whose live update failed during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentFailure {
    pub instrument: InstrumentId,
    pub message: String,
}

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub mode: DataMode,
    pub records: Vec<PriceRecord>,
    pub failures: Vec<InstrumentFailure>,
    pub updated_at: UtcDateTime,
}

#[derive(Debug)]
struct MonitorState {
    policy: DegradationPolicy,
    engine: ConversionEngine,
    synthetic: SyntheticGenerator,
    records: BTreeMap<InstrumentId, PriceRecord>,
    failures: BTreeMap<InstrumentId, String>,
    last_update: Option<UtcDateTime>,
    offline: bool,
}

pub struct PriceMonitor {
    resolver: SourceResolver,
    context: MonitorContext,
    state: Mutex<MonitorState>,
    cycle_gate: tokio::sync::Mutex<()>,
    events: broadcast::Sender<MonitorEvent>,
    item_pause: Duration,
}

impl PriceMonitor {
    pub fn new(resolver: SourceResolver, config: &MonitorConfig) -> Self {
        Self::with_generators(
            resolver,
            config,
            ConversionEngine::new(),
            SyntheticGenerator::new(),
        )
    }

    /// Builds a monitor with explicit generators, e.g. seeded ones.
    pub fn with_generators(
        resolver: SourceResolver,
        config: &MonitorConfig,
        engine: ConversionEngine,
        synthetic: SyntheticGenerator,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            resolver,
            context: MonitorContext::new(config.cache_ttl()),
            state: Mutex::new(MonitorState {
                policy: DegradationPolicy::new(),
                engine,
                synthetic,
                records: BTreeMap::new(),
                failures: BTreeMap::new(),
                last_update: None,
                offline: false,
            }),
            cycle_gate: tokio::sync::Mutex::new(()),
            events,
            item_pause: config.item_pause(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub fn context(&self) -> &MonitorContext {
        &self.context
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    /// Startup: probe both categories, settle the mode, run the first cycle.
    pub async fn start(&self) -> CycleReport {
        let _gate = self.cycle_gate.lock().await;
        if self.mode() == DataMode::Connecting {
            self.probe_locked().await;
        }
        self.run_cycle().await
    }

    /// Startup without network access: synthetic for the whole session.
    pub async fn start_offline(&self) -> CycleReport {
        let _gate = self.cycle_gate.lock().await;
        let changed = {
            let mut state = self.lock_state();
            state.offline = true;
            state.policy.force_synthetic()
        };
        if let Some(mode) = changed {
            self.emit(MonitorEvent::ModeChanged { mode });
        }
        self.run_cycle().await
    }

    /// Resolves every category once and applies the result to the policy.
    pub async fn probe(&self) -> ProbeOutcome {
        let _gate = self.cycle_gate.lock().await;
        self.probe_locked().await
    }

    /// Runs a cycle, waiting for any cycle in flight.
    pub async fn refresh(&self) -> CycleReport {
        let _gate = self.cycle_gate.lock().await;
        self.run_cycle().await
    }

    /// Runs a cycle unless one is already in flight.
    pub async fn try_refresh(&self) -> Option<CycleReport> {
        let Ok(_gate) = self.cycle_gate.try_lock() else {
            info!("refresh skipped; a cycle is already running");
            return None;
        };
        Some(self.run_cycle().await)
    }

    /// Clears the whole cache, then runs a cycle.
    ///
    /// Waits for an in-flight cycle first so invalidation never interleaves
    /// with one. Outside `Live` (and unless started offline) the categories
    /// are re-probed, which is the only way back from `Synthetic`.
    pub async fn manual_refresh(&self) -> CycleReport {
        let _gate = self.cycle_gate.lock().await;
        self.context.cache.clear().await;
        info!("cache cleared by manual refresh");

        let reprobe = {
            let state = self.lock_state();
            !state.offline && !state.policy.uses_live_data()
        };
        if reprobe {
            self.probe_locked().await;
        }
        self.run_cycle().await
    }

    pub fn mode(&self) -> DataMode {
        self.lock_state().policy.mode()
    }

    pub fn record(&self, instrument: InstrumentId) -> Option<PriceRecord> {
        self.lock_state().records.get(&instrument).cloned()
    }

    /// Latest record per instrument, in catalogue order.
    pub fn records(&self) -> Vec<PriceRecord> {
        self.lock_state().records.values().cloned().collect()
    }

    /// Inline error marker from the last cycle.
    pub fn failure(&self, instrument: InstrumentId) -> Option<String> {
        self.lock_state().failures.get(&instrument).cloned()
    }

    pub fn provider_status(&self, category: Category) -> ProviderStatus {
        self.context.status.get(category)
    }

    pub fn status_label(&self, category: Category) -> &'static str {
        self.provider_status(category).label()
    }

    pub fn last_update(&self) -> Option<UtcDateTime> {
        self.lock_state().last_update
    }

    /// Synthetic series ending today (UTC) for preset periods.
    pub fn history(&self, instrument: InstrumentId, period: Period) -> HistoricalSeries {
        self.history_at(instrument, period, UtcDateTime::now().date())
    }

    pub fn history_at(&self, instrument: InstrumentId, period: Period, today: Date) -> HistoricalSeries {
        self.lock_state()
            .synthetic
            .history(instrument, period, today)
    }

    /// One series per instrument, in catalogue order.
    pub fn chart(&self, period: Period) -> Vec<HistoricalSeries> {
        let today = UtcDateTime::now().date();
        let mut state = self.lock_state();
        InstrumentId::ALL
            .into_iter()
            .map(|instrument| state.synthetic.history(instrument, period, today))
            .collect()
    }

    async fn probe_locked(&self) -> ProbeOutcome {
        let mut outcome = ProbeOutcome::default();
        for category in Category::ALL {
            match self.resolve_tracked(category).await {
                Ok(_) => outcome.resolved.push(category),
                Err(_) => outcome.failed.push(category),
            }
        }

        let changed = self.lock_state().policy.on_probe(&outcome);
        if let Some(mode) = changed {
            self.emit(MonitorEvent::ModeChanged { mode });
        }
        info!(
            resolved = outcome.resolved.len(),
            failed = outcome.failed.len(),
            mode = self.mode().as_str(),
            "connectivity probe finished"
        );
        outcome
    }

    async fn run_cycle(&self) -> CycleReport {
        let live = self.lock_state().policy.uses_live_data();
        let mut records = Vec::with_capacity(InstrumentId::ALL.len());
        let mut failures = Vec::new();

        for (index, instrument) in InstrumentId::ALL.into_iter().enumerate() {
            if index > 0 && !self.item_pause.is_zero() {
                tokio::time::sleep(self.item_pause).await;
            }

            let live_result = if live {
                Some(self.live_record(instrument).await)
            } else {
                None
            };

            let record = {
                let mut state = self.lock_state();
                let record = match live_result {
                    Some(Ok(record)) => {
                        state.failures.remove(&instrument);
                        record
                    }
                    Some(Err(message)) => {
                        warn!(instrument = %instrument, reason = %message, "live update failed; using synthetic data");
                        state.failures.insert(instrument, message.clone());
                        failures.push(InstrumentFailure {
                            instrument,
                            message: message.clone(),
                        });
                        self.emit(MonitorEvent::UpdateFailed {
                            instrument,
                            message,
                        });
                        state.synthetic.price_record(instrument)
                    }
                    None => {
                        state.failures.remove(&instrument);
                        state.synthetic.price_record(instrument)
                    }
                };
                state.records.insert(instrument, record.clone());
                record
            };

            self.emit(MonitorEvent::RecordUpdated {
                record: record.clone(),
            });
            records.push(record);
        }

        let updated_at = UtcDateTime::now();
        let mode = {
            let mut state = self.lock_state();
            state.last_update = Some(updated_at);
            state.policy.mode()
        };
        self.emit(MonitorEvent::CycleCompleted {
            updated_at,
            records: records.len(),
            failures: failures.len(),
        });
        info!(
            mode = mode.as_str(),
            records = records.len(),
            failures = failures.len(),
            "refresh cycle completed"
        );

        CycleReport {
            mode,
            records,
            failures,
            updated_at,
        }
    }

    async fn live_record(&self, instrument: InstrumentId) -> Result<PriceRecord, String> {
        let descriptor = instrument.instrument();
        let mut forex = None;
        let mut gold = None;
        for category in descriptor.recipe.required_categories() {
            let resolved = self
                .resolve_tracked(*category)
                .await
                .map_err(|failure| failure.to_string())?;
            match category {
                Category::ExchangeRates => forex = Some(resolved.quote),
                Category::GoldSpot => gold = Some(resolved.quote),
            }
        }

        let forex = forex.ok_or_else(|| String::from("exchange rates were not resolved"))?;
        self.lock_state()
            .engine
            .convert(descriptor, &forex, gold.as_ref())
            .map_err(|error| error.to_string())
    }

    async fn resolve_tracked(&self, category: Category) -> ResolveResult {
        let before = self.context.status.get(category);
        let result = self.resolver.resolve(&self.context, category).await;
        let after = self.context.status.get(category);
        if before != after {
            self.emit(MonitorEvent::StatusChanged {
                category,
                status: after,
            });
        }
        result
    }

    fn emit(&self, event: MonitorEvent) {
        let _ = self.events.send(event);
    }

    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PriceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceMonitor")
            .field("resolver", &self.resolver)
            .field("mode", &self.mode())
            .field("item_pause", &self.item_pause)
            .finish_non_exhaustive()
    }
}
