//! Time source abstraction and elapsed-time arithmetic.
//!
//! All timestamps in the crate are epoch milliseconds (`i64`), matching the
//! wire payload. Components never read the wall clock directly; they hold a
//! [`Clock`] so tests can drive simulated time.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::error::CoreError;
use crate::participant::SealProgress;

/// Source of "now" in epoch milliseconds.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time via chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Settable clock for tests and simulated sessions. Cloning shares the
/// underlying instant, so a test can hold one handle and advance time for
/// every component it injected.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self { now: Arc::new(AtomicI64::new(now_millis)) }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_millis: i64) {
        self.now.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Elapsed run time for a participant's progress.
///
/// Completed runs are frozen at `completed_at - started_at`; in-progress
/// runs report time elapsed so far.
pub fn elapsed_millis(progress: &SealProgress, now_millis: i64) -> Result<i64, CoreError> {
    let started_at = progress
        .started_at
        .ok_or_else(|| CoreError::InvalidRecord("progress has no start timestamp".to_string()))?;

    if let Some(completed_at) = progress.completed_at {
        return Ok(completed_at - started_at);
    }

    if now_millis < started_at {
        return Err(CoreError::InvalidRecord(format!(
            "start timestamp {} is in the future (now {})",
            started_at, now_millis
        )));
    }

    Ok(now_millis - started_at)
}

/// Format a duration as zero-padded `MM:SS`.
///
/// Non-positive durations format as `"00:00"`. Minutes are not truncated,
/// so long sessions render as e.g. `"123:07"`.
pub fn format_duration(millis: i64) -> String {
    if millis <= 0 {
        return "00:00".to_string();
    }
    let total_seconds = millis / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
