use std::time::Duration;

use crate::cache::QuoteCache;
use crate::status::StatusBoard;

/// Shared mutable state of one monitor: category cache and provider status.
///
/// Both halves are internally synchronized and cheap to clone; the monitor
/// owns one context and lends it to the resolver on every call.
#[derive(Debug, Clone, Default)]
pub struct MonitorContext {
    pub cache: QuoteCache,
    pub status: StatusBoard,
}

impl MonitorContext {
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            cache: QuoteCache::new(cache_ttl),
            status: StatusBoard::new(),
        }
    }
}
