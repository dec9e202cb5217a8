//! Performance report derived from stats and review states.
//!
//! Pure aggregation: nothing here feeds back into scheduling.

use super::{Category, Question, ReviewState, UserStats};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const STRONG_THRESHOLD: u32 = 80;
const AVERAGE_THRESHOLD: u32 = 60;
const WEAK_AREA_THRESHOLD: u32 = 70;
const MAX_RECENT_MISTAKES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryStatus {
    Strong,
    Average,
    Weak,
    NotAttempted,
}

impl CategoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryStatus::Strong => "strong",
            CategoryStatus::Average => "average",
            CategoryStatus::Weak => "weak",
            CategoryStatus::NotAttempted => "not-attempted",
        }
    }

    fn classify(attempted: u32, accuracy: u32) -> Self {
        if attempted == 0 {
            CategoryStatus::NotAttempted
        } else if accuracy >= STRONG_THRESHOLD {
            CategoryStatus::Strong
        } else if accuracy >= AVERAGE_THRESHOLD {
            CategoryStatus::Average
        } else {
            CategoryStatus::Weak
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Percent, rounded
    pub accuracy: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: Category,
    pub attempted: u32,
    pub correct: u32,
    pub accuracy: u32,
    pub status: CategoryStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakArea {
    pub category: Category,
    pub accuracy: u32,
    pub questions_attempted: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyBreakdown {
    pub difficulty: u8,
    pub attempted: u32,
    pub correct: u32,
    pub accuracy: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentMistake {
    pub question_id: String,
    /// Category key, or "unknown" when the question is no longer in the bank
    pub category: String,
    pub attempts: u32,
    pub correct_attempts: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub summary: ReportSummary,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub weak_areas: Vec<WeakArea>,
    pub difficulty_breakdown: Vec<DifficultyBreakdown>,
    pub recent_mistakes: Vec<RecentMistake>,
    pub recommendations: Vec<String>,
}

/// Rounded percentage, 0 when nothing was attempted.
pub fn percent(correct: u32, attempted: u32) -> u32 {
    if attempted == 0 {
        return 0;
    }
    (correct as f64 / attempted as f64 * 100.0).round() as u32
}

pub fn generate_performance_report(
    stats: &UserStats,
    progress: &[ReviewState],
    questions: &[Question],
) -> PerformanceReport {
    let accuracy = percent(stats.correct_answers, stats.total_questions);
    let by_id: HashMap<&str, &Question> = questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let category_breakdown: Vec<CategoryBreakdown> = stats
        .category_scores
        .iter()
        .map(|(&category, score)| {
            let accuracy = percent(score.correct, score.attempted);
            CategoryBreakdown {
                category,
                attempted: score.attempted,
                correct: score.correct,
                accuracy,
                status: CategoryStatus::classify(score.attempted, accuracy),
            }
        })
        .collect();

    let mut weak_areas: Vec<WeakArea> = category_breakdown
        .iter()
        .filter(|c| c.accuracy < WEAK_AREA_THRESHOLD && c.attempted > 2)
        .map(|c| WeakArea {
            category: c.category,
            accuracy: c.accuracy,
            questions_attempted: c.attempted,
        })
        .collect();
    weak_areas.sort_by_key(|w| w.accuracy);

    let mut per_difficulty: BTreeMap<u8, (u32, u32)> = BTreeMap::new();
    for state in progress {
        let Some(question) = by_id.get(state.question_id.as_str()) else {
            continue;
        };
        let entry = per_difficulty.entry(question.difficulty).or_default();
        entry.0 += state.attempts;
        entry.1 += state.correct_attempts;
    }
    let difficulty_breakdown: Vec<DifficultyBreakdown> = per_difficulty
        .into_iter()
        .map(|(difficulty, (attempted, correct))| DifficultyBreakdown {
            difficulty,
            attempted,
            correct,
            accuracy: percent(correct, attempted),
        })
        .collect();

    let mut struggling: Vec<&ReviewState> = progress
        .iter()
        .filter(|p| p.attempts >= 2 && p.accuracy() < 0.5)
        .collect();
    struggling.sort_by(|a, b| a.accuracy().total_cmp(&b.accuracy()));
    let recent_mistakes = struggling
        .into_iter()
        .take(MAX_RECENT_MISTAKES)
        .map(|p| RecentMistake {
            question_id: p.question_id.clone(),
            category: by_id
                .get(p.question_id.as_str())
                .map_or("unknown", |q| q.category.as_str())
                .to_string(),
            attempts: p.attempts,
            correct_attempts: p.correct_attempts,
        })
        .collect();

    let recommendations = build_recommendations(
        stats,
        accuracy,
        &category_breakdown,
        &weak_areas,
        &difficulty_breakdown,
    );

    PerformanceReport {
        summary: ReportSummary {
            total_questions: stats.total_questions,
            correct_answers: stats.correct_answers,
            accuracy,
            current_streak: stats.current_streak,
            longest_streak: stats.longest_streak,
        },
        category_breakdown,
        weak_areas,
        difficulty_breakdown,
        recent_mistakes,
        recommendations,
    }
}

fn build_recommendations(
    stats: &UserStats,
    accuracy: u32,
    categories: &[CategoryBreakdown],
    weak_areas: &[WeakArea],
    difficulties: &[DifficultyBreakdown],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !weak_areas.is_empty() {
        let names: Vec<String> = weak_areas.iter().map(|w| w.category.label()).collect();
        recommendations.push(format!("Focus on: {}", names.join(", ")));
    }

    // min_by_key keeps the lowest difficulty on ties
    let hardest = difficulties
        .iter()
        .filter(|d| d.attempted > 0)
        .min_by_key(|d| d.accuracy);
    if let Some(hardest) = hardest {
        if hardest.accuracy < AVERAGE_THRESHOLD {
            recommendations.push(format!(
                "Difficulty {} questions need more practice ({}% accuracy)",
                hardest.difficulty, hardest.accuracy
            ));
        }
    }

    let not_attempted: Vec<String> = categories
        .iter()
        .filter(|c| c.status == CategoryStatus::NotAttempted)
        .map(|c| c.category.label())
        .collect();
    if !not_attempted.is_empty() {
        recommendations.push(format!("Try questions in: {}", not_attempted.join(", ")));
    }

    if stats.current_streak == 0 {
        recommendations.push("Start a daily practice streak to improve retention".to_string());
    }

    if accuracy < WEAK_AREA_THRESHOLD && stats.total_questions > 10 {
        recommendations
            .push("Review explanations carefully to understand concepts better".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryScore, QuestionType};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn question(id: &str, category: Category, difficulty: u8) -> Question {
        Question {
            id: id.to_string(),
            category,
            difficulty,
            question_type: QuestionType::SpotError,
            code: String::new(),
            question: "?".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct: 0,
            explanation: String::new(),
            error_line: None,
            rust_book_link: None,
            tags: Vec::new(),
        }
    }

    fn progress(id: &str, attempts: u32, correct: u32) -> ReviewState {
        let t = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        ReviewState {
            question_id: id.to_string(),
            attempts,
            correct_attempts: correct,
            last_attempted: t,
            next_review: t,
            ease_factor: 2.5,
            interval: 0,
        }
    }

    fn stats_with(scores: &[(Category, u32, u32)], streak: u32) -> UserStats {
        let mut stats = UserStats::new(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
        for &(category, attempted, correct) in scores {
            stats
                .category_scores
                .insert(category, CategoryScore { attempted, correct });
            stats.total_questions += attempted;
            stats.correct_answers += correct;
        }
        stats.current_streak = streak;
        stats.longest_streak = streak;
        stats
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
    }

    #[test]
    fn test_category_status() {
        let stats = stats_with(
            &[
                (Category::Ownership, 10, 8),
                (Category::Lifetimes, 10, 6),
                (Category::Macros, 10, 5),
            ],
            1,
        );
        let report = generate_performance_report(&stats, &[], &[]);
        let status = |c: Category| {
            report
                .category_breakdown
                .iter()
                .find(|b| b.category == c)
                .map(|b| b.status)
                .unwrap()
        };

        assert_eq!(status(Category::Ownership), CategoryStatus::Strong);
        assert_eq!(status(Category::Lifetimes), CategoryStatus::Average);
        assert_eq!(status(Category::Macros), CategoryStatus::Weak);
        assert_eq!(status(Category::Unsafe), CategoryStatus::NotAttempted);
        assert_eq!(report.category_breakdown.len(), Category::ALL.len());
        assert_eq!(report.summary.accuracy, 63);
    }

    #[test]
    fn test_weak_areas_sorted_and_filtered() {
        let stats = stats_with(
            &[
                (Category::Ownership, 5, 3),
                (Category::Lifetimes, 4, 1),
                (Category::Macros, 2, 0),
                (Category::Unsafe, 10, 9),
            ],
            2,
        );
        let report = generate_performance_report(&stats, &[], &[]);

        let weak: Vec<Category> = report.weak_areas.iter().map(|w| w.category).collect();
        assert_eq!(weak, vec![Category::Lifetimes, Category::Ownership]);
        assert_eq!(report.weak_areas[0].accuracy, 25);
        assert_eq!(report.weak_areas[0].questions_attempted, 4);
        assert_eq!(report.recommendations[0], "Focus on: lifetimes, ownership");
    }

    #[test]
    fn test_difficulty_breakdown_uses_question_lookup() {
        let questions = vec![
            question("a", Category::Ownership, 1),
            question("b", Category::Ownership, 3),
            question("c", Category::Macros, 1),
        ];
        let progress = vec![
            progress("a", 4, 4),
            progress("b", 5, 1),
            progress("c", 2, 1),
            progress("gone", 9, 0),
        ];
        let stats = stats_with(&[(Category::Ownership, 9, 5), (Category::Macros, 2, 1)], 1);

        let report = generate_performance_report(&stats, &progress, &questions);
        assert_eq!(
            report.difficulty_breakdown,
            vec![
                DifficultyBreakdown {
                    difficulty: 1,
                    attempted: 6,
                    correct: 5,
                    accuracy: 83
                },
                DifficultyBreakdown {
                    difficulty: 3,
                    attempted: 5,
                    correct: 1,
                    accuracy: 20
                },
            ]
        );
        assert!(report
            .recommendations
            .contains(&"Difficulty 3 questions need more practice (20% accuracy)".to_string()));
    }

    #[test]
    fn test_recent_mistakes() {
        let questions = vec![question("q0", Category::Unsafe, 2)];
        let mut all = vec![
            progress("single", 1, 0),
            progress("fine", 4, 2),
            progress("q0", 3, 1),
        ];
        for i in 0..12 {
            all.push(progress(&format!("z{i}"), 5, 0));
        }

        let stats = stats_with(&[], 0);
        let report = generate_performance_report(&stats, &all, &questions);

        assert_eq!(report.recent_mistakes.len(), 10);
        assert!(report.recent_mistakes.iter().all(|m| m.correct_attempts == 0));
        assert_eq!(report.recent_mistakes[0].question_id, "z0");
        assert_eq!(report.recent_mistakes[0].category, "unknown");

        let few = generate_performance_report(&stats, &all[..3], &questions);
        assert_eq!(few.recent_mistakes.len(), 1);
        assert_eq!(few.recent_mistakes[0].question_id, "q0");
        assert_eq!(few.recent_mistakes[0].category, "unsafe");
    }

    #[test]
    fn test_recommendations() {
        let mut scores: Vec<(Category, u32, u32)> =
            Category::ALL.iter().map(|&c| (c, 2, 1)).collect();
        scores[0] = (Category::Ownership, 3, 1);
        let stats = stats_with(&scores, 0);

        let report = generate_performance_report(&stats, &[], &[]);
        assert_eq!(
            report.recommendations,
            vec![
                "Focus on: ownership".to_string(),
                "Start a daily practice streak to improve retention".to_string(),
                "Review explanations carefully to understand concepts better".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_stats_recommend_everything_untried() {
        let stats = stats_with(&[], 3);
        let report = generate_performance_report(&stats, &[], &[]);

        assert_eq!(report.summary.accuracy, 0);
        assert!(report.weak_areas.is_empty());
        assert!(report.difficulty_breakdown.is_empty());
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].starts_with("Try questions in: ownership, lifetimes"));
    }

    #[test]
    fn test_report_json_keys() {
        let stats = stats_with(&[(Category::Ownership, 1, 0)], 0);
        let report = generate_performance_report(&stats, &[], &[]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["totalQuestions"], 1);
        assert_eq!(json["categoryBreakdown"][0]["category"], "ownership");
        assert_eq!(json["categoryBreakdown"][1]["status"], "not-attempted");
    }
}
