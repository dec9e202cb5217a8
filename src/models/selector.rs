//! Picks the next question to present.
//!
//! Questions fall into exactly one tier relative to `now`:
//! - due: answered before and `next_review <= now`
//! - new: never answered
//! - scheduled: answered before and not due yet
//!
//! Due questions win, then new ones, then scheduled ones weighted toward low accuracy.

use super::ReviewState;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Question ids split into the three scheduling tiers.
#[derive(Debug, Default)]
pub struct Tiers<'a> {
    pub due: Vec<&'a str>,
    pub new: Vec<&'a str>,
    pub scheduled: Vec<(&'a str, &'a ReviewState)>,
}

/// Splits `all_ids` into tiers. Input order is preserved within each tier.
pub fn partition<'a>(
    all_ids: &'a [String],
    states: &'a HashMap<String, ReviewState>,
    now: DateTime<Utc>,
) -> Tiers<'a> {
    let mut tiers = Tiers::default();

    for id in all_ids {
        match states.get(id) {
            None => tiers.new.push(id),
            Some(state) if state.is_due(now) => tiers.due.push(id),
            Some(state) => tiers.scheduled.push((id, state)),
        }
    }

    tiers
}

/// Selects the id of the next question, or `None` when `all_ids` is empty.
///
/// `all_ids` is expected to hold each id once. States for ids that are not in
/// `all_ids` are ignored.
pub fn select_next<'a, R: Rng + ?Sized>(
    all_ids: &'a [String],
    states: &'a HashMap<String, ReviewState>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<&'a str> {
    let tiers = partition(all_ids, states, now);

    if let Some(&id) = tiers.due.choose(rng) {
        return Some(id);
    }
    if let Some(&id) = tiers.new.choose(rng) {
        return Some(id);
    }
    pick_weakest_weighted(tiers.scheduled, rng)
}

/// Rank-weighted draw: after sorting by accuracy (weakest first) the item at
/// rank `i` of `n` gets weight `n - i`.
fn pick_weakest_weighted<'a, R: Rng + ?Sized>(
    mut candidates: Vec<(&'a str, &'a ReviewState)>,
    rng: &mut R,
) -> Option<&'a str> {
    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by(|(_, a), (_, b)| a.accuracy().total_cmp(&b.accuracy()));

    let n = candidates.len();
    let total_weight = n * (n + 1) / 2;
    let mut target = rng.gen_range(0..total_weight);

    for (rank, &(id, _)) in candidates.iter().enumerate() {
        let weight = n - rank;
        if target < weight {
            return Some(id);
        }
        target -= weight;
    }

    candidates.first().map(|(id, _)| *id)
}
