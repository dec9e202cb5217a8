//! Quiz session state for the presentation layer.
//! Picks questions with the selector and records answers with SM-2.

use super::{
    PerformanceReport, Question, ReviewState, UserStats, generate_performance_report,
    selector::{partition, select_next},
    sm2::compute_next_state,
};
use crate::database::{DbResult, db};
use crate::export::json::QuestionBank;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use rusqlite::Connection;
use std::collections::HashMap;

/// Everything the quiz screen needs between answers.
///
/// The store stays the source of truth: every answer is written through
/// before the in-memory copy is updated.
pub struct QuizSession {
    questions: Vec<Question>,
    question_ids: Vec<String>,
    progress: HashMap<String, ReviewState>,
    stats: UserStats,
    current_index: Option<usize>,
    rng: StdRng,
}

impl QuizSession {
    /// Loads questions, review states and stats, then picks the first question.
    pub fn load(conn: &Connection, now: DateTime<Utc>, rng: StdRng) -> DbResult<Self> {
        let questions = db::get_all_questions(conn)?;
        let progress = db::get_all_review_states(conn)?;
        let stats = db::get_stats(now.date_naive(), conn)?;

        log::info!(
            "Loaded {} questions with {} review states",
            questions.len(),
            progress.len()
        );

        let mut session = Self {
            question_ids: questions.iter().map(|q| q.id.clone()).collect(),
            questions,
            progress,
            stats,
            current_index: None,
            rng,
        };
        session.next_question(now);
        Ok(session)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index.and_then(|i| self.questions.get(i))
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn review_state(&self, question_id: &str) -> Option<&ReviewState> {
        self.progress.get(question_id)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// `(due, new, scheduled)` question counts at `now`.
    pub fn tier_counts(&self, now: DateTime<Utc>) -> (usize, usize, usize) {
        let tiers = partition(&self.question_ids, &self.progress, now);
        (tiers.due.len(), tiers.new.len(), tiers.scheduled.len())
    }

    /// Moves to the question the scheduler wants next.
    pub fn next_question(&mut self, now: DateTime<Utc>) {
        let picked = select_next(&self.question_ids, &self.progress, now, &mut self.rng)
            .and_then(|id| self.question_ids.iter().position(|q| q == id));

        self.current_index = match picked {
            Some(i) => Some(i),
            // select_next only gives up on an empty id list
            None if !self.questions.is_empty() => {
                Some(self.rng.gen_range(0..self.questions.len()))
            }
            None => None,
        };

        if let Some(q) = self.current_question() {
            log::debug!("Next question: {}", q.id);
        }
    }

    /// Grades the current question and persists the new review state and stats.
    /// Returns whether the answer was correct, or `false` when no question is shown.
    pub fn submit_answer(
        &mut self,
        answer_index: usize,
        now: DateTime<Utc>,
        conn: &Connection,
    ) -> DbResult<bool> {
        let Some(question) = self.current_question() else {
            return Ok(false);
        };
        let id = question.id.clone();
        let category = question.category;
        let is_correct = question.is_correct(answer_index);

        // Read-modify-write against the store, which owns the state
        let prior = db::get_review_state(&id, conn)?;
        let new_state = compute_next_state(&id, prior.as_ref(), is_correct, now);
        db::put_review_state(&new_state, conn)?;

        let mut stats = self.stats.clone();
        stats.record_answer(category, is_correct, now.date_naive());
        db::update_stats(&stats, conn)?;

        log::info!(
            "Answered {} ({}), next review in {} day(s)",
            id,
            if is_correct { "correct" } else { "wrong" },
            new_state.interval
        );

        self.progress.insert(id, new_state);
        self.stats = stats;
        Ok(is_correct)
    }

    pub fn generate_report(&self, conn: &Connection) -> DbResult<PerformanceReport> {
        let all_progress = db::get_all_progress(conn)?;
        Ok(generate_performance_report(
            &self.stats,
            &all_progress,
            &self.questions,
        ))
    }

    /// Re-imports a question bank, reloads everything from the store and picks a question.
    pub fn refresh_questions(
        &mut self,
        bank: &QuestionBank,
        now: DateTime<Utc>,
        conn: &Connection,
    ) -> DbResult<()> {
        db::install_question_bank(&bank.questions, bank.version, now, conn)?;

        self.questions = db::get_all_questions(conn)?;
        self.question_ids = self.questions.iter().map(|q| q.id.clone()).collect();
        self.progress = db::get_all_review_states(conn)?;
        self.next_question(now);
        Ok(())
    }
}
