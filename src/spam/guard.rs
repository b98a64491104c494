use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::record::SubmissionRecord;
use super::store::{RecordStore, StoreError};

/// Submissions allowed before the 24-hour block is imposed.
pub const DAILY_CAP: u32 = 5;
/// Submissions allowed within the trailing hour.
pub const HOURLY_CAP: u32 = 3;
pub const HOURLY_WINDOW_MS: i64 = 3_600_000;
pub const BLOCK_WINDOW_MS: i64 = 86_400_000;
/// Present in the original configuration but never consulted by the policy;
/// kept declared pending product intent.
pub const MIN_SUBMISSION_INTERVAL_MS: i64 = 60_000;

/// Outcome of a spam-protection check.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Decision {
    fn allow() -> Self {
        Self {
            allowed: true,
            message: None,
        }
    }

    fn reject(message: String) -> Self {
        Self {
            allowed: false,
            message: Some(message),
        }
    }
}

/// Quota snapshot for UI display ("2 of 5 used today, resets in 43 minutes").
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmissionStatus {
    pub daily_count: u32,
    pub hourly_count: u32,
    pub time_until_reset_ms: i64,
    pub is_blocked: bool,
}

/// Submission rate limiter guarding the contact form.
///
/// One policy over an injected store: the hourly cap rejects with a retry
/// hint, the daily cap escalates to a 24-hour block. Every public method is
/// fail-open: a storage malfunction must never keep a legitimate visitor
/// from submitting, so internal errors are logged and converted to the
/// permissive outcome.
#[derive(Clone)]
pub struct SpamGuard {
    store: Arc<dyn RecordStore>,
}

impl SpamGuard {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Decide whether a submission from `key` is allowed right now.
    ///
    /// Read-mostly, with two write exceptions: a stale record is deleted on
    /// sight, and reaching the daily cap persists the block timestamp.
    pub fn check(&self, key: &str, now_ms: i64) -> Decision {
        match self.check_inner(key, now_ms) {
            Ok(decision) => decision,
            Err(err) => {
                warn!(key, error = %err, "spam check failed, allowing submission");
                Decision::allow()
            }
        }
    }

    fn check_inner(&self, key: &str, now_ms: i64) -> Result<Decision, StoreError> {
        let Some(mut record) = self.store.get(key)? else {
            return Ok(Decision::allow());
        };

        if let Some(until) = record.blocked_until_ms {
            if now_ms < until {
                let hours = remaining_whole_hours(until - now_ms);
                return Ok(Decision::reject(format!(
                    "Submissions are temporarily blocked. Please try again in {} hour{}.",
                    hours,
                    if hours == 1 { "" } else { "s" }
                )));
            }
        }

        if record.is_stale(now_ms, BLOCK_WINDOW_MS) {
            // Delete on sight so the stale count can never resurrect.
            self.store.delete(key)?;
            debug!(key, "expired submission record dropped");
            return Ok(Decision::allow());
        }

        // Daily cap before hourly cap: reaching the daily limit always
        // escalates to the block, even inside the hourly window.
        if record.count >= DAILY_CAP {
            record.blocked_until_ms = Some(now_ms + BLOCK_WINDOW_MS);
            self.store.put(key, &record)?;
            return Ok(Decision::reject(format!(
                "You can send at most {} messages per day. Submissions are blocked for the next 24 hours.",
                DAILY_CAP
            )));
        }

        if now_ms - record.last_submission_ms < HOURLY_WINDOW_MS && record.count >= HOURLY_CAP {
            return Ok(Decision::reject(format!(
                "You can send at most {} messages per hour. Please try again in about 1 hour.",
                HOURLY_CAP
            )));
        }

        Ok(Decision::allow())
    }

    /// Record an accepted submission for `key`.
    ///
    /// Rolls the hourly counter: more than an hour since the last submission
    /// resets the count to 1, otherwise it increments. Storage failures are
    /// logged and swallowed; the caller proceeds as if recording succeeded.
    pub fn record(&self, key: &str, now_ms: i64) {
        if let Err(err) = self.record_inner(key, now_ms) {
            warn!(key, error = %err, "failed to record submission");
        }
    }

    fn record_inner(&self, key: &str, now_ms: i64) -> Result<(), StoreError> {
        let record = match self.store.get(key)? {
            None => SubmissionRecord::first(now_ms),
            Some(mut rec) => {
                if now_ms - rec.last_submission_ms > HOURLY_WINDOW_MS {
                    rec.count = 1;
                } else {
                    rec.count += 1;
                }
                rec.last_submission_ms = now_ms;
                rec
            }
        };
        self.store.put(key, &record)
    }

    /// Current quota snapshot for `key`. Pure read; applies the same
    /// staleness and blocking rules as `check`, reporting all-zero on
    /// absence, staleness, or internal error.
    pub fn status(&self, key: &str, now_ms: i64) -> SubmissionStatus {
        match self.status_inner(key, now_ms) {
            Ok(status) => status,
            Err(err) => {
                warn!(key, error = %err, "status lookup failed, reporting empty quota");
                SubmissionStatus::default()
            }
        }
    }

    fn status_inner(&self, key: &str, now_ms: i64) -> Result<SubmissionStatus, StoreError> {
        let Some(record) = self.store.get(key)? else {
            return Ok(SubmissionStatus::default());
        };

        if record.is_blocked(now_ms) {
            let until = record.blocked_until_ms.unwrap_or(now_ms);
            return Ok(SubmissionStatus {
                daily_count: record.count,
                hourly_count: hourly_count(&record, now_ms),
                time_until_reset_ms: until - now_ms,
                is_blocked: true,
            });
        }

        if record.is_stale(now_ms, BLOCK_WINDOW_MS) {
            return Ok(SubmissionStatus::default());
        }

        let within_hour = now_ms - record.last_submission_ms < HOURLY_WINDOW_MS;
        Ok(SubmissionStatus {
            daily_count: record.count,
            hourly_count: if within_hour { record.count } else { 0 },
            time_until_reset_ms: if within_hour {
                record.last_submission_ms + HOURLY_WINDOW_MS - now_ms
            } else {
                0
            },
            is_blocked: false,
        })
    }

    /// Delete every record older than 24 hours whose block has expired.
    /// Returns the number of records removed (0 on storage failure).
    pub fn sweep(&self, now_ms: i64) -> usize {
        match self.store.purge_stale(now_ms - BLOCK_WINDOW_MS, now_ms) {
            Ok(removed) => {
                if removed > 0 {
                    debug!(removed, "swept stale submission records");
                }
                removed
            }
            Err(err) => {
                warn!(error = %err, "sweep failed");
                0
            }
        }
    }
}

fn hourly_count(record: &SubmissionRecord, now_ms: i64) -> u32 {
    if now_ms - record.last_submission_ms < HOURLY_WINDOW_MS {
        record.count
    } else {
        0
    }
}

/// Whole hours until `remaining_ms` elapses, rounded up.
fn remaining_whole_hours(remaining_ms: i64) -> i64 {
    (remaining_ms + HOURLY_WINDOW_MS - 1) / HOURLY_WINDOW_MS
}
