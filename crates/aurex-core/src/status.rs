use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::data_source::Category;
use crate::ProviderId;

/// Label shown before any outcome is recorded.
pub const UNKNOWN_LABEL: &str = "unknown";
/// Label shown after every provider in a chain failed.
pub const FAILED_LABEL: &str = "fetch failed";

/// Who last served a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "provider", rename_all = "snake_case")]
pub enum ProviderStatus {
    #[default]
    Unknown,
    Serving(ProviderId),
    Failed,
}

impl ProviderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => UNKNOWN_LABEL,
            Self::Serving(provider) => provider.display_name(),
            Self::Failed => FAILED_LABEL,
        }
    }
}

/// Shared per-category provider status, written by the resolver.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<BTreeMap<Category, ProviderStatus>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new status; returns whether it differs from the previous one.
    pub fn record(&self, category: Category, status: ProviderStatus) -> bool {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(category, status) != Some(status)
    }

    pub fn get(&self, category: Category) -> ProviderStatus {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&category)
            .copied()
            .unwrap_or_default()
    }

    /// Status for every category, in category order.
    pub fn snapshot(&self) -> Vec<(Category, ProviderStatus)> {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.get(category)))
            .collect()
    }
}
