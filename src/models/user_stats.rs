//! Running totals, practice streaks and per-category scores.
use super::Category;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub attempted: u32,
    pub correct: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Calendar day (UTC) of the most recent answer
    pub last_practice_date: NaiveDate,
    pub category_scores: BTreeMap<Category, CategoryScore>,
}

impl UserStats {
    /// Fresh stats with every category present and zeroed.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            total_questions: 0,
            correct_answers: 0,
            current_streak: 0,
            longest_streak: 0,
            last_practice_date: today,
            category_scores: Category::ALL
                .into_iter()
                .map(|c| (c, CategoryScore::default()))
                .collect(),
        }
    }

    /// Folds one answer into the totals and the daily streak.
    ///
    /// The first answer on a new day extends the streak when the previous
    /// practice day was yesterday and restarts it at 1 otherwise.
    pub fn record_answer(&mut self, category: Category, was_correct: bool, today: NaiveDate) {
        self.total_questions = self.total_questions.saturating_add(1);
        self.correct_answers = self.correct_answers.saturating_add(u32::from(was_correct));

        if today != self.last_practice_date {
            let yesterday = today.checked_sub_days(Days::new(1));
            self.current_streak = if yesterday == Some(self.last_practice_date) {
                self.current_streak.saturating_add(1)
            } else {
                1
            };
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_practice_date = today;

        let score = self.category_scores.entry(category).or_default();
        score.attempted = score.attempted.saturating_add(1);
        score.correct = score.correct.saturating_add(u32::from(was_correct));
    }
}
