//! Periodic refresh tied to visibility and connectivity signals.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::monitor::{CycleReport, PriceMonitor};
use crate::policy::DataMode;

/// Environment signals gating the periodic timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub visible: bool,
    pub online: bool,
}

impl Signals {
    pub const fn active(self) -> bool {
        self.visible && self.online
    }
}

impl Default for Signals {
    fn default() -> Self {
        Self {
            visible: true,
            online: true,
        }
    }
}

/// Signals plus the number of active-to-inactive transitions made so far.
#[derive(Debug, Clone, Copy, Default)]
struct SignalState {
    signals: Signals,
    suspensions: u64,
}

impl SignalState {
    fn update(&mut self, apply: impl FnOnce(&mut Signals)) -> bool {
        let before = self.signals;
        apply(&mut self.signals);
        if before.active() && !self.signals.active() {
            self.suspensions += 1;
        }
        before != self.signals
    }
}

enum Command {
    ManualRefresh(Option<oneshot::Sender<CycleReport>>),
    Shutdown,
}

/// Spawns the refresh task for a monitor.
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Starts the task with both signals up.
    ///
    /// The first tick fires immediately: it runs the monitor's startup probe
    /// while the mode is still `Connecting`, a regular cycle otherwise.
    /// Must be called inside a tokio runtime.
    pub fn spawn(monitor: Arc<PriceMonitor>, interval: Duration) -> SchedulerHandle {
        let (signals_tx, signals_rx) = watch::channel(SignalState::default());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(monitor, interval, signals_rx, commands_rx));

        SchedulerHandle {
            signals: signals_tx,
            commands: commands_tx,
            task,
        }
    }
}

/// Control surface of a running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    signals: watch::Sender<SignalState>,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Hiding the display suspends the timer; showing it resumes with an eager refresh.
    pub fn set_visible(&self, visible: bool) {
        self.signals
            .send_if_modified(|state| state.update(|signals| signals.visible = visible));
    }

    /// Losing connectivity suspends the timer; regaining it resumes with an eager refresh.
    pub fn set_online(&self, online: bool) {
        self.signals
            .send_if_modified(|state| state.update(|signals| signals.online = online));
    }

    pub fn signals(&self) -> Signals {
        self.signals.borrow().signals
    }

    /// Clears the cache and runs a cycle; `None` once the task has stopped.
    pub async fn manual_refresh(&self) -> Option<CycleReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::ManualRefresh(Some(reply_tx)))
            .ok()?;
        reply_rx.await.ok()
    }

    /// Queues a manual refresh without waiting for it; `false` once the task has stopped.
    pub fn request_refresh(&self) -> bool {
        self.commands.send(Command::ManualRefresh(None)).is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the task after any cycle in flight.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(error) = self.task.await {
            warn!(error = %error, "refresh scheduler task ended abnormally");
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ManualRefresh(reply) => f
                .debug_tuple("ManualRefresh")
                .field(&reply.is_some())
                .finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

async fn run(
    monitor: Arc<PriceMonitor>,
    period: Duration,
    mut signals: watch::Receiver<SignalState>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut ticker = Some(eager_interval(period));
    let mut seen_suspensions = 0;
    info!(interval_ms = period.as_millis() as u64, "refresh scheduler started");

    loop {
        tokio::select! {
            changed = signals.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *signals.borrow_and_update();
                let suspended_meanwhile = current.suspensions != seen_suspensions;
                seen_suspensions = current.suspensions;
                let Signals { visible, online } = current.signals;
                if !current.signals.active() {
                    if ticker.take().is_some() {
                        info!(visible, online, "refresh timer suspended");
                    }
                } else if ticker.is_none() || suspended_meanwhile {
                    info!(visible, online, "refresh timer resumed");
                    ticker = Some(eager_interval(period));
                }
            }
            command = commands.recv() => match command {
                Some(Command::ManualRefresh(reply)) => {
                    let report = monitor.manual_refresh().await;
                    if let Some(reply) = reply {
                        let _ = reply.send(report);
                    }
                }
                Some(Command::Shutdown) | None => break,
            },
            _ = next_tick(&mut ticker) => {
                if monitor.mode() == DataMode::Connecting {
                    monitor.start().await;
                } else if monitor.try_refresh().await.is_none() {
                    debug!("periodic refresh coalesced with a cycle in flight");
                }
            }
        }
    }

    info!("refresh scheduler stopped");
}

/// Interval whose first tick completes immediately.
fn eager_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
