mod app;
use rustlens::*;

use anyhow::anyhow;
use app::QuizApp;
use rustlens::config::Config;
use rustlens::database::db;
use rustlens::export::json::{QuestionBank, bundled_question_bank, import_question_bank};
use rustlens::models::review_state::now;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn load_question_bank(config: &Config) -> anyhow::Result<QuestionBank> {
    let bank = match &config.questions.bank_path {
        Some(path) => {
            let path = path
                .to_str()
                .ok_or_else(|| anyhow!("question bank path is not valid UTF-8"))?;
            import_question_bank(path)
        }
        None => bundled_question_bank(),
    };
    bank.map_err(|e| anyhow!("failed to load question bank: {e}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load();
    if Config::config_path().is_some_and(|p| !p.exists()) {
        if let Err(e) = config.save() {
            log::warn!("Could not write default config: {}", e);
        }
    }

    let conn = db::init_database(&config.db_path()?)?;
    let bank = load_question_bank(&config)?;

    // Import the bank on first run or when a newer bundle ships
    let installed = db::get_metadata(&conn)?.map(|m| m.question_bundle_version);
    if installed.is_none_or(|v| v < bank.version) || db::get_all_question_ids(&conn)?.is_empty() {
        db::install_question_bank(&bank.questions, bank.version, now(), &conn)?;
    }

    let session = QuizSession::load(&conn, now(), StdRng::from_entropy())?;
    let settings = db::get_settings(&conn)?;

    log::info!(
        "Loaded {} questions, {} answered so far",
        session.question_count(),
        session.stats().total_questions
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "RustLens",
        options,
        Box::new(|_cc| Ok(Box::new(QuizApp::new(conn, session, settings, bank)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
