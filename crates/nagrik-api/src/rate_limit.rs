use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::auth::Caller;
use crate::config::AppConfig;
use crate::error::AppError;

/// Fixed-window limit on report submissions per caller.
#[derive(Clone)]
pub struct SubmissionRateLimiter {
    state: Arc<Mutex<LimiterState>>,
    window: Duration,
    limit: u32,
    metrics: Arc<RateLimitMetrics>,
}

#[derive(Default)]
struct RateLimitMetrics {
    allowed: AtomicU64,
    limited: AtomicU64,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RateLimitMetricsSnapshot {
    pub allowed: u64,
    pub limited: u64,
}

struct LimiterState {
    windows: HashMap<String, RateWindow>,
    last_pruned: Instant,
}

impl LimiterState {
    /// Drop windows that expired, at most once per window length.
    fn prune(&mut self, now: Instant, window: Duration) {
        if now.duration_since(self.last_pruned) < window {
            return;
        }
        self.windows
            .retain(|_, entry| now.duration_since(entry.started_at) < window);
        self.last_pruned = now;
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    started_at: Instant,
    count: u32,
}

impl SubmissionRateLimiter {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.rate_limit_window, config.submissions_per_window)
    }

    fn new(window: Duration, limit: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_pruned: Instant::now(),
            })),
            window,
            limit,
            metrics: Arc::new(RateLimitMetrics::default()),
        }
    }

    pub async fn check(&self, caller: &Caller) -> Result<(), AppError> {
        let key = caller.rate_limit_key();
        let now = Instant::now();
        let mut guard = self.state.lock().await;
        guard.prune(now, self.window);
        let entry = guard.windows.entry(key).or_insert(RateWindow {
            started_at: now,
            count: 0,
        });

        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }

        if entry.count >= self.limit {
            let retry_after_secs = self
                .window
                .saturating_sub(now.duration_since(entry.started_at))
                .as_secs();
            self.metrics.limited.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                caller = caller.rate_limit_key(),
                retry_after_secs,
                "Report submission rate limit exceeded"
            );
            return Err(AppError::too_many_requests(
                "Too many report submissions",
                retry_after_secs,
            ));
        }

        entry.count += 1;
        self.metrics.allowed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn metrics_snapshot(&self) -> RateLimitMetricsSnapshot {
        RateLimitMetricsSnapshot {
            allowed: self.metrics.allowed.load(Ordering::Relaxed),
            limited: self.metrics.limited.load(Ordering::Relaxed),
        }
    }
}
