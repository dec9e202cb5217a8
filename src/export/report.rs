//! Text and JSON renderings of a performance report.

use crate::models::PerformanceReport;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;

const WIDTH: usize = 60;

pub fn format_report_as_text(report: &PerformanceReport, generated_at: DateTime<Utc>) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(heavy.clone());
    lines.push("RUSTLENS PERFORMANCE REPORT".to_string());
    lines.push(heavy.clone());
    lines.push(String::new());

    let summary = &report.summary;
    lines.push("📊 OVERALL PERFORMANCE".to_string());
    lines.push(light.clone());
    lines.push(format!("Total Questions Answered: {}", summary.total_questions));
    lines.push(format!("Correct Answers: {}", summary.correct_answers));
    lines.push(format!("Overall Accuracy: {}%", summary.accuracy));
    lines.push(format!("Current Streak: {} days", summary.current_streak));
    lines.push(format!("Longest Streak: {} days", summary.longest_streak));
    lines.push(String::new());

    lines.push("📚 CATEGORY BREAKDOWN".to_string());
    lines.push(light.clone());
    lines.push("Category                    Attempted  Correct  Accuracy  Status".to_string());
    lines.push(light.clone());
    let mut categories: Vec<_> = report.category_breakdown.iter().collect();
    categories.sort_by(|a, b| b.attempted.cmp(&a.attempted));
    for cat in categories {
        lines.push(format!(
            "{:<26} {:>8} {:>8} {:>8} {:>12}",
            cat.category.label(),
            cat.attempted,
            cat.correct,
            format!("{}%", cat.accuracy),
            cat.status.as_str().to_uppercase()
        ));
    }
    lines.push(String::new());

    if !report.weak_areas.is_empty() {
        lines.push("⚠️  WEAK AREAS (Need Improvement)".to_string());
        lines.push(light.clone());
        for (i, area) in report.weak_areas.iter().enumerate() {
            lines.push(format!(
                "{}. {}: {}% accuracy ({} questions)",
                i + 1,
                area.category.label(),
                area.accuracy,
                area.questions_attempted
            ));
        }
        lines.push(String::new());
    }

    if !report.difficulty_breakdown.is_empty() {
        lines.push("🎯 DIFFICULTY BREAKDOWN".to_string());
        lines.push(light.clone());
        lines.push("Difficulty  Attempted  Correct  Accuracy".to_string());
        lines.push(light.clone());
        for diff in &report.difficulty_breakdown {
            let filled = (diff.difficulty as usize).min(5);
            let stars = format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled));
            lines.push(format!(
                "{:<11} {:>9} {:>8} {:>8}",
                stars,
                diff.attempted,
                diff.correct,
                format!("{}%", diff.accuracy)
            ));
        }
        lines.push(String::new());
    }

    if !report.recent_mistakes.is_empty() {
        lines.push("❌ RECENT STRUGGLES".to_string());
        lines.push(light.clone());
        let mut per_category: Vec<(&str, usize)> = Vec::new();
        for mistake in &report.recent_mistakes {
            let category = mistake.category.as_str();
            match per_category.iter_mut().find(|(c, _)| *c == category) {
                Some((_, count)) => *count += 1,
                None => per_category.push((category, 1)),
            }
        }
        per_category.sort_by(|a, b| b.1.cmp(&a.1));
        for (category, count) in per_category {
            lines.push(format!(
                "- {}: {} question(s) with low accuracy",
                category.replace('_', " "),
                count
            ));
        }
        lines.push(String::new());
    }

    if !report.recommendations.is_empty() {
        lines.push("💡 RECOMMENDATIONS".to_string());
        lines.push(light.clone());
        for (i, rec) in report.recommendations.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, rec));
        }
        lines.push(String::new());
    }

    lines.push(heavy.clone());
    lines.push(format!(
        "Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(heavy);

    lines.join("\n")
}

pub fn format_report_as_json(report: &PerformanceReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Writes a rendered report to `path`.
pub fn export_report_to_path(contents: &str, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    log::info!("Report written to '{}'", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Category, CategoryScore, ReviewState, UserStats, generate_performance_report,
    };
    use chrono::{NaiveDate, TimeZone};
    use std::fs;

    fn sample_report() -> PerformanceReport {
        let mut stats = UserStats::new(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        stats.category_scores.insert(
            Category::PatternMatching,
            CategoryScore {
                attempted: 5,
                correct: 1,
            },
        );
        stats.category_scores.insert(
            Category::Ownership,
            CategoryScore {
                attempted: 2,
                correct: 2,
            },
        );
        stats.total_questions = 7;
        stats.correct_answers = 3;

        let t = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let mistakes = vec![
            ReviewState {
                question_id: "gone-1".to_string(),
                attempts: 3,
                correct_attempts: 0,
                last_attempted: t,
                next_review: t,
                ease_factor: 1.3,
                interval: 0,
            },
            ReviewState {
                question_id: "gone-2".to_string(),
                attempts: 2,
                correct_attempts: 0,
                last_attempted: t,
                next_review: t,
                ease_factor: 1.3,
                interval: 0,
            },
        ];

        generate_performance_report(&stats, &mistakes, &[])
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 3, 14, 5, 0).unwrap()
    }

    #[test]
    fn test_text_report_sections() {
        let text = format_report_as_text(&sample_report(), generated_at());

        assert!(text.starts_with(&"=".repeat(60)));
        assert!(text.contains("Total Questions Answered: 7"));
        assert!(text.contains("Overall Accuracy: 43%"));
        assert!(text.contains("1. pattern matching: 20% accuracy (5 questions)"));
        assert!(text.contains("- unknown: 2 question(s) with low accuracy"));
        assert!(text.contains("Start a daily practice streak"));
        assert!(text.contains("Generated: 2026-02-03 14:05:00 UTC"));
        assert!(!text.contains("DIFFICULTY BREAKDOWN"));
    }

    #[test]
    fn test_text_report_category_rows_sorted_by_attempts() {
        let text = format_report_as_text(&sample_report(), generated_at());
        let first = text.find("pattern matching ").unwrap();
        let second = text.find("ownership ").unwrap();
        let untried = text.find("lifetimes ").unwrap();
        assert!(first < second && second < untried);

        let row = text
            .lines()
            .find(|l| l.starts_with("pattern matching"))
            .unwrap();
        assert_eq!(
            row,
            format!("{:<26} {:>8} {:>8} {:>8} {:>12}", "pattern matching", 5, 1, "20%", "WEAK")
        );
    }

    #[test]
    fn test_json_report() {
        let json = format_report_as_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["accuracy"], 43);
        assert_eq!(value["weakAreas"][0]["category"], "pattern_matching");
        assert_eq!(value["recentMistakes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_export_report_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        export_report_to_path("hello report", path.to_str().unwrap()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello report");
    }
}
