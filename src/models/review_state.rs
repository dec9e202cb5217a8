//! Per-question review state tracked by the scheduler.
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Scheduling and bookkeeping data for a single question.
///
/// A state only exists once the question has been answered at least once,
/// so `attempts >= 1` holds for every stored value. It is always replaced as a
/// whole after an answer, never patched field by field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub question_id: String,
    pub attempts: u32,
    pub correct_attempts: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_attempted: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review: DateTime<Utc>,
    pub ease_factor: f64,
    /// Days until the next review. 0 means the question is in the short relearning step.
    pub interval: u32,
}

impl ReviewState {
    /// Share of correct answers, 0.0 when the question was never attempted.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.correct_attempts as f64 / self.attempts as f64
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

/// Current wall-clock time truncated to milliseconds, the precision the store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
