//! Database operations for the quiz application
//!
//! Handles SQLite initialization, the question bank, per-question review states,
//! and JSON-encoded app state (stats, settings, bundle metadata).

use crate::models::{AppSettings, Category, Question, ReviewState, UserStats};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSqlError, Type};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

const STATS_KEY: &str = "user-stats";
const SETTINGS_KEY: &str = "app-settings";
const METADATA_KEY: &str = "sync-metadata";

/// Which question bundle was last imported, and when.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    pub question_bundle_version: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_sync: DateTime<Utc>,
}

/// Opens (or creates) the database file and makes sure all tables exist
pub fn init_database(path: &Path) -> DbResult<Connection> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    log::info!("Opened database at {}", path.display());
    Ok(conn)
}

/// In-memory database with the full schema
pub fn init_in_memory() -> DbResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS questions (
            id TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            difficulty INTEGER NOT NULL,
            data TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS progress (
            question_id TEXT PRIMARY KEY,
            attempts INTEGER NOT NULL,
            correct_attempts INTEGER NOT NULL,
            last_attempted INTEGER NOT NULL,
            next_review INTEGER NOT NULL,
            ease_factor REAL NOT NULL,
            interval_days INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);
        CREATE INDEX IF NOT EXISTS idx_questions_difficulty ON questions(difficulty);
        CREATE INDEX IF NOT EXISTS idx_progress_next_review ON progress(next_review);",
    )?;
    Ok(())
}

// Questions

/// Inserts or replaces questions in a single transaction
pub fn bulk_add_questions(questions: &[Question], conn: &Connection) -> DbResult<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO questions (id, category, difficulty, data)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for question in questions {
            stmt.execute(params![
                question.id,
                question.category.as_str(),
                question.difficulty,
                serde_json::to_string(question)?,
            ])?;
        }
    }
    tx.commit()?;
    log::info!("Stored {} questions", questions.len());
    Ok(())
}

/// Stores a question bank and records its version as the installed bundle
pub fn install_question_bank(
    questions: &[Question],
    version: u32,
    now: DateTime<Utc>,
    conn: &Connection,
) -> DbResult<()> {
    bulk_add_questions(questions, conn)?;
    update_metadata(
        &BundleMetadata {
            question_bundle_version: version,
            last_sync: now,
        },
        conn,
    )?;
    log::info!("Installed question bundle v{}", version);
    Ok(())
}

fn decode_questions(rows: Vec<String>) -> DbResult<Vec<Question>> {
    rows.iter()
        .map(|data| serde_json::from_str(data).map_err(DbError::from))
        .collect()
}

/// All questions, ordered by id
pub fn get_all_questions(conn: &Connection) -> DbResult<Vec<Question>> {
    let mut stmt = conn.prepare("SELECT data FROM questions ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    decode_questions(rows)
}

pub fn get_questions_by_category(category: Category, conn: &Connection) -> DbResult<Vec<Question>> {
    let mut stmt = conn.prepare("SELECT data FROM questions WHERE category = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map(params![category.as_str()], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    decode_questions(rows)
}

pub fn get_question_by_id(id: &str, conn: &Connection) -> DbResult<Option<Question>> {
    let data: Option<String> = conn
        .query_row("SELECT data FROM questions WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(data.map(|d| serde_json::from_str(&d)).transpose()?)
}

pub fn get_all_question_ids(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT id FROM questions ORDER BY id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

// Review states

fn millis_to_datetime(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            Box::new(FromSqlError::OutOfRange(millis)),
        )
    })
}

fn review_state_from_row(row: &Row) -> rusqlite::Result<ReviewState> {
    Ok(ReviewState {
        question_id: row.get(0)?,
        attempts: row.get(1)?,
        correct_attempts: row.get(2)?,
        last_attempted: millis_to_datetime(3, row.get(3)?)?,
        next_review: millis_to_datetime(4, row.get(4)?)?,
        ease_factor: row.get(5)?,
        interval: row.get(6)?,
    })
}

const SELECT_PROGRESS: &str = "SELECT question_id, attempts, correct_attempts, last_attempted,
     next_review, ease_factor, interval_days FROM progress";

pub fn get_review_state(question_id: &str, conn: &Connection) -> DbResult<Option<ReviewState>> {
    let state = conn
        .query_row(
            &format!("{SELECT_PROGRESS} WHERE question_id = ?1"),
            params![question_id],
            review_state_from_row,
        )
        .optional()?;
    Ok(state)
}

/// Stores a review state, replacing any previous one for the same question
pub fn put_review_state(state: &ReviewState, conn: &Connection) -> DbResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO progress
            (question_id, attempts, correct_attempts, last_attempted,
             next_review, ease_factor, interval_days)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            state.question_id,
            state.attempts,
            state.correct_attempts,
            state.last_attempted.timestamp_millis(),
            state.next_review.timestamp_millis(),
            state.ease_factor,
            state.interval,
        ],
    )?;
    log::debug!(
        "Saved review state for {} (interval {} days)",
        state.question_id,
        state.interval
    );
    Ok(())
}

pub fn get_all_progress(conn: &Connection) -> DbResult<Vec<ReviewState>> {
    let mut stmt = conn.prepare(&format!("{SELECT_PROGRESS} ORDER BY question_id"))?;
    let states = stmt
        .query_map([], review_state_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(states)
}

/// Review states keyed by question id
pub fn get_all_review_states(conn: &Connection) -> DbResult<HashMap<String, ReviewState>> {
    Ok(get_all_progress(conn)?
        .into_iter()
        .map(|s| (s.question_id.clone(), s))
        .collect())
}

/// Ids of questions whose next review is at or before `now`, oldest first
pub fn get_questions_due_for_review(
    now: DateTime<Utc>,
    conn: &Connection,
) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT question_id FROM progress WHERE next_review <= ?1 ORDER BY next_review ASC",
    )?;
    let ids = stmt
        .query_map(params![now.timestamp_millis()], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

// App state

fn get_json<T: DeserializeOwned>(key: &str, conn: &Connection) -> DbResult<Option<T>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.map(|v| serde_json::from_str(&v)).transpose()?)
}

fn put_json<T: Serialize>(key: &str, value: &T, conn: &Connection) -> DbResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
        params![key, serde_json::to_string(value)?],
    )?;
    Ok(())
}

/// Loads user stats, creating and storing fresh ones on first use
pub fn get_stats(today: NaiveDate, conn: &Connection) -> DbResult<UserStats> {
    if let Some(stats) = get_json(STATS_KEY, conn)? {
        return Ok(stats);
    }
    let stats = UserStats::new(today);
    update_stats(&stats, conn)?;
    Ok(stats)
}

pub fn update_stats(stats: &UserStats, conn: &Connection) -> DbResult<()> {
    put_json(STATS_KEY, stats, conn)
}

/// Loads settings, creating and storing the defaults on first use
pub fn get_settings(conn: &Connection) -> DbResult<AppSettings> {
    if let Some(settings) = get_json(SETTINGS_KEY, conn)? {
        return Ok(settings);
    }
    let settings = AppSettings::default();
    update_settings(&settings, conn)?;
    Ok(settings)
}

pub fn update_settings(settings: &AppSettings, conn: &Connection) -> DbResult<()> {
    put_json(SETTINGS_KEY, settings, conn)
}

pub fn get_metadata(conn: &Connection) -> DbResult<Option<BundleMetadata>> {
    get_json(METADATA_KEY, conn)
}

pub fn update_metadata(metadata: &BundleMetadata, conn: &Connection) -> DbResult<()> {
    put_json(METADATA_KEY, metadata, conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    fn question(id: &str, category: Category) -> Question {
        Question {
            id: id.to_string(),
            category,
            difficulty: 2,
            question_type: QuestionType::PredictOutput,
            code: "fn main() {}".to_string(),
            question: "What does this print?".to_string(),
            options: vec!["Nothing".to_string(), "Hello".to_string()],
            correct: 0,
            explanation: "main is empty".to_string(),
            error_line: Some(1),
            rust_book_link: None,
            tags: vec!["basics".to_string()],
        }
    }

    fn state(id: &str, next_review: DateTime<Utc>) -> ReviewState {
        ReviewState {
            question_id: id.to_string(),
            attempts: 3,
            correct_attempts: 2,
            last_attempted: t0(),
            next_review,
            ease_factor: 2.36,
            interval: 6,
        }
    }

    #[test]
    fn test_questions_roundtrip() {
        let conn = init_in_memory().unwrap();
        let questions = vec![
            question("b", Category::Macros),
            question("a", Category::Ownership),
            question("c", Category::Macros),
        ];
        bulk_add_questions(&questions, &conn).unwrap();

        let all = get_all_questions(&conn).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], questions[1]);
        assert_eq!(get_all_question_ids(&conn).unwrap(), vec!["a", "b", "c"]);

        let macros = get_questions_by_category(Category::Macros, &conn).unwrap();
        assert_eq!(macros.len(), 2);
        assert!(macros.iter().all(|q| q.category == Category::Macros));

        assert_eq!(get_question_by_id("c", &conn).unwrap(), Some(questions[2].clone()));
        assert_eq!(get_question_by_id("zzz", &conn).unwrap(), None);
    }

    #[test]
    fn test_bulk_add_replaces_existing() {
        let conn = init_in_memory().unwrap();
        bulk_add_questions(&[question("a", Category::Ownership)], &conn).unwrap();

        let mut changed = question("a", Category::Unsafe);
        changed.correct = 1;
        bulk_add_questions(&[changed.clone()], &conn).unwrap();

        assert_eq!(get_all_questions(&conn).unwrap(), vec![changed]);
        assert!(get_questions_by_category(Category::Ownership, &conn).unwrap().is_empty());
    }

    #[test]
    fn test_review_state_roundtrip_is_exact() {
        let conn = init_in_memory().unwrap();
        assert_eq!(get_review_state("q1", &conn).unwrap(), None);

        let saved = state("q1", t0() + Duration::days(6));
        put_review_state(&saved, &conn).unwrap();
        assert_eq!(get_review_state("q1", &conn).unwrap(), Some(saved.clone()));

        let replaced = ReviewState {
            attempts: 4,
            interval: 0,
            ..saved
        };
        put_review_state(&replaced, &conn).unwrap();
        assert_eq!(get_all_progress(&conn).unwrap(), vec![replaced.clone()]);
        assert_eq!(get_all_review_states(&conn).unwrap()["q1"], replaced);
    }

    #[test]
    fn test_questions_due_for_review() {
        let conn = init_in_memory().unwrap();
        put_review_state(&state("later", t0() + Duration::hours(1)), &conn).unwrap();
        put_review_state(&state("now", t0()), &conn).unwrap();
        put_review_state(&state("old", t0() - Duration::days(2)), &conn).unwrap();

        assert_eq!(
            get_questions_due_for_review(t0(), &conn).unwrap(),
            vec!["old", "now"]
        );
    }

    #[test]
    fn test_stats_default_is_persisted() {
        let conn = init_in_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();

        let stats = get_stats(today, &conn).unwrap();
        assert_eq!(stats, UserStats::new(today));

        let mut updated = stats.clone();
        updated.record_answer(Category::Lifetimes, true, today);
        update_stats(&updated, &conn).unwrap();

        let later = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(get_stats(later, &conn).unwrap(), updated);
    }

    #[test]
    fn test_settings_default_and_update() {
        let conn = init_in_memory().unwrap();
        assert_eq!(get_settings(&conn).unwrap(), AppSettings::default());

        let settings = AppSettings {
            timed_mode: true,
            time_per_question: 30,
            ..AppSettings::default()
        };
        update_settings(&settings, &conn).unwrap();
        assert_eq!(get_settings(&conn).unwrap(), settings);
    }

    #[test]
    fn test_metadata() {
        let conn = init_in_memory().unwrap();
        assert_eq!(get_metadata(&conn).unwrap(), None);

        let metadata = BundleMetadata {
            question_bundle_version: 3,
            last_sync: t0(),
        };
        update_metadata(&metadata, &conn).unwrap();
        assert_eq!(get_metadata(&conn).unwrap(), Some(metadata));
    }

    #[test]
    fn test_install_question_bank() {
        let conn = init_in_memory().unwrap();
        install_question_bank(&[question("a", Category::Lifetimes)], 4, t0(), &conn).unwrap();

        assert_eq!(get_all_question_ids(&conn).unwrap(), vec!["a"]);
        assert_eq!(
            get_metadata(&conn).unwrap(),
            Some(BundleMetadata {
                question_bundle_version: 4,
                last_sync: t0(),
            })
        );
    }

    #[test]
    fn test_init_database_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.sqlite3");

        {
            let conn = init_database(&path).unwrap();
            put_review_state(&state("q1", t0()), &conn).unwrap();
        }

        let conn = init_database(&path).unwrap();
        assert_eq!(get_all_progress(&conn).unwrap().len(), 1);
    }
}
