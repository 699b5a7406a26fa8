/*!
 * Process-wide usage counters.
 *
 * Counts served narrations and narrated time. Updates are atomic but not
 * transactional: the counters are informational only.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

static GLOBAL_USAGE: Lazy<Arc<UsageStats>> = Lazy::new(|| Arc::new(UsageStats::new()));

/// Receiver for per-request usage reports
pub trait UsageSink: Send + Sync {
    /// Called once for every completed narration
    fn record(&self, narrated_secs: f64);
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSnapshot {
    pub requests: u64,
    pub narrated_secs: f64,
    pub last_used: Option<DateTime<Local>>,
}

#[derive(Debug, Default)]
pub struct UsageStats {
    requests: AtomicU64,
    narrated_millis: AtomicU64,
    last_used: Mutex<Option<DateTime<Local>>>,
}

impl UsageStats {
    /// Fresh counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters shared by the whole process
    pub fn global() -> Arc<UsageStats> {
        Arc::clone(&GLOBAL_USAGE)
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            narrated_secs: self.narrated_millis.load(Ordering::Relaxed) as f64 / 1000.0,
            last_used: *self.last_used.lock(),
        }
    }
}

impl UsageSink for UsageStats {
    fn record(&self, narrated_secs: f64) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let millis = (narrated_secs.max(0.0) * 1000.0) as u64;
        self.narrated_millis.fetch_add(millis, Ordering::Relaxed);
        *self.last_used.lock() = Some(Local::now());
    }
}

impl std::fmt::Display for UsageSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last = self.last_used
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        write!(f, "{} requests, {:.1}s narrated, last used {}", self.requests, self.narrated_secs, last)
    }
}
