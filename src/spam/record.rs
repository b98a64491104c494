use serde::{Deserialize, Serialize};

/// Per-identity submission record persisted by the record store.
///
/// Absence of a record means zero submissions and unblocked; a record is only
/// created once a submission is actually recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Submissions observed in the current counting window. Resets to 1 (not
    /// 0) when a new submission arrives more than an hour after the last.
    pub count: u32,
    /// Epoch milliseconds of the most recent accepted submission.
    pub last_submission_ms: i64,
    /// When set and in the future, every submission is rejected outright.
    pub blocked_until_ms: Option<i64>,
}

impl SubmissionRecord {
    pub fn first(now_ms: i64) -> Self {
        Self {
            count: 1,
            last_submission_ms: now_ms,
            blocked_until_ms: None,
        }
    }

    /// True once the record is older than `max_age_ms` relative to `now_ms`.
    pub fn is_stale(&self, now_ms: i64, max_age_ms: i64) -> bool {
        now_ms.saturating_sub(self.last_submission_ms) > max_age_ms
    }

    /// True while an unexpired block is in force.
    pub fn is_blocked(&self, now_ms: i64) -> bool {
        matches!(self.blocked_until_ms, Some(until) if now_ms < until)
    }
}
