use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data_source::Category;

/// Global data sourcing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    #[default]
    Connecting,
    Live,
    Synthetic,
}

impl DataMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Live => "live",
            Self::Synthetic => "synthetic",
        }
    }

    /// Indicator text for the presentation layer.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Live => "live data",
            Self::Synthetic => "synthetic data",
        }
    }
}

/// Result of one connectivity probe: which categories resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub resolved: Vec<Category>,
    pub failed: Vec<Category>,
}

impl ProbeOutcome {
    pub fn all_resolved(&self) -> bool {
        self.failed.is_empty() && !self.resolved.is_empty()
    }
}

/// Connecting / Live / Synthetic state machine.
///
/// A probe out of `Connecting` decides the session mode. `Synthetic` only
/// returns to `Live` through an explicit re-probe (manual refresh) in which
/// every category resolves; `Live` never demotes on a later probe because
/// per-instrument failures are handled one cycle at a time.
#[derive(Debug, Clone, Default)]
pub struct DegradationPolicy {
    mode: DataMode,
}

impl DegradationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn mode(&self) -> DataMode {
        self.mode
    }

    pub const fn uses_live_data(&self) -> bool {
        matches!(self.mode, DataMode::Live)
    }

    /// Applies a probe; returns the new mode when it changed.
    pub fn on_probe(&mut self, outcome: &ProbeOutcome) -> Option<DataMode> {
        let next = match (self.mode, outcome.all_resolved()) {
            (DataMode::Connecting, true) | (DataMode::Synthetic, true) => DataMode::Live,
            (DataMode::Connecting, false) => DataMode::Synthetic,
            (current, _) => current,
        };
        self.transition(next)
    }

    /// Enters `Synthetic` without probing (offline start).
    pub fn force_synthetic(&mut self) -> Option<DataMode> {
        self.transition(DataMode::Synthetic)
    }

    fn transition(&mut self, next: DataMode) -> Option<DataMode> {
        if next == self.mode {
            return None;
        }
        info!(from = self.mode.as_str(), to = next.as_str(), "data mode changed");
        self.mode = next;
        Some(next)
    }
}
