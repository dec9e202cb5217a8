pub mod question;
pub mod quiz_session;
pub mod report;
pub mod review_state;
pub mod selector;
pub mod settings;
pub mod sm2;
pub mod user_stats;

pub use question::{Category, Question, QuestionType};
pub use quiz_session::QuizSession;
pub use report::{
    CategoryBreakdown, CategoryStatus, DifficultyBreakdown, PerformanceReport, RecentMistake,
    ReportSummary, WeakArea, generate_performance_report,
};
pub use review_state::ReviewState;
pub use selector::select_next;
pub use settings::AppSettings;
pub use sm2::compute_next_state;
pub use user_stats::{CategoryScore, UserStats};
