pub mod config;
pub mod database;
pub mod export;
pub mod models;

pub use models::{Question, QuizSession, ReviewState, compute_next_state, select_next};
