//! JSON import for question banks.
//! A bank is a versioned list of questions; one bank ships inside the binary.

use crate::models::Question;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;

const BUNDLED_BANK: &str = include_str!("../../data/questions.json");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionBank {
    pub version: u32,
    pub questions: Vec<Question>,
}

/// Parses and validates a question bank from a JSON string.
pub fn parse_question_bank(json: &str) -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let bank: QuestionBank = serde_json::from_str(json)?;
    validate(&bank)?;
    Ok(bank)
}

/// The question bank compiled into the application.
pub fn bundled_question_bank() -> Result<QuestionBank, Box<dyn std::error::Error>> {
    parse_question_bank(BUNDLED_BANK)
}

/// Imports a question bank from a JSON file.
/// Returns an error if the file doesn't exist, contains invalid JSON or invalid questions.
pub fn import_question_bank(filename: &str) -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let bank = parse_question_bank(&contents)?;

    log::info!(
        "Imported {} questions (bundle v{}) from '{}'",
        bank.questions.len(),
        bank.version,
        filename
    );
    Ok(bank)
}

fn validate(bank: &QuestionBank) -> Result<(), String> {
    let mut seen = HashSet::new();
    for q in &bank.questions {
        if !seen.insert(q.id.as_str()) {
            return Err(format!("duplicate question id '{}'", q.id));
        }
        if !(1..=5).contains(&q.difficulty) {
            return Err(format!("question '{}' has difficulty {}", q.id, q.difficulty));
        }
        if q.correct >= q.options.len() {
            return Err(format!(
                "question '{}' marks option {} correct but has {} options",
                q.id,
                q.correct,
                q.options.len()
            ));
        }
    }
    Ok(())
}
