//! SM-2 (SuperMemo 2) review scheduling for quiz questions.
//!
//! Answers are binary, so the classic 0-5 quality grade is collapsed to two values:
//! - Correct answers score 5 and grow the interval (1 day → 6 days → interval × EF)
//! - Wrong answers score 2, reset the interval and bring the question back in 10 minutes
//! - The easiness factor (EF) is adjusted after every answer and never drops below 1.3

use super::ReviewState;
use chrono::{DateTime, Duration, SubsecRound, Utc};

pub const INITIAL_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Delay before a wrongly answered question becomes due again.
pub const RELEARN_DELAY_MINUTES: i64 = 10;

const QUALITY_CORRECT: u8 = 5;
const QUALITY_WRONG: u8 = 2;

/// Computes the review state that replaces `prior` after an answer at `now`.
///
/// `prior` is `None` for a question that has never been answered.
pub fn compute_next_state(
    question_id: &str,
    prior: Option<&ReviewState>,
    was_correct: bool,
    now: DateTime<Utc>,
) -> ReviewState {
    let (interval, ease_factor) = match prior {
        None => (if was_correct { 1 } else { 0 }, INITIAL_EASE_FACTOR),
        Some(prior) => {
            let quality = if was_correct {
                QUALITY_CORRECT
            } else {
                QUALITY_WRONG
            };
            next_interval(prior.interval, prior.ease_factor, quality)
        }
    };

    let delay = if interval == 0 {
        Duration::try_minutes(RELEARN_DELAY_MINUTES)
    } else {
        Duration::try_days(interval as i64)
    };
    // Long streaks can push the interval past the representable date range
    let next_review = delay
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or_else(|| DateTime::<Utc>::MAX_UTC.trunc_subsecs(3));

    let attempts = prior.map_or(0, |p| p.attempts);
    let correct_attempts = prior.map_or(0, |p| p.correct_attempts);

    ReviewState {
        question_id: question_id.to_string(),
        attempts: attempts.saturating_add(1),
        correct_attempts: correct_attempts.saturating_add(u32::from(was_correct)),
        last_attempted: now,
        next_review,
        ease_factor,
        interval,
    }
}

/// Returns the new `(interval_days, ease_factor)` for a graded answer.
fn next_interval(old_interval: u32, old_ef: f64, quality: u8) -> (u32, f64) {
    let q = quality as f64;
    let new_ef = (old_ef + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASE_FACTOR);

    if quality < 3 {
        // Failed recall restarts the interval but keeps the adjusted EF
        return (0, new_ef);
    }

    let new_interval = match old_interval {
        0 => 1,
        1 => 6,
        n => (n as f64 * new_ef).round() as u32,
    };
    (new_interval, new_ef)
}
