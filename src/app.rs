//! Main application UI.
//! Shows the current quiz question, progress stats, settings and the performance report.

use crate::database::db;
use crate::export::json::QuestionBank;
use crate::export::report::{export_report_to_path, format_report_as_json, format_report_as_text};
use crate::models::report::percent;
use crate::models::review_state::now;
use crate::models::{AppSettings, PerformanceReport, QuizSession};
use eframe::egui;
use rusqlite::Connection;
use std::time::{Duration, Instant};

#[derive(Default, Clone, Copy, PartialEq)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Answer that can never match an option, used when the timer runs out
const TIMED_OUT: usize = usize::MAX;

/// Main application state
pub struct QuizApp {
    conn: Connection,
    session: QuizSession,
    settings: AppSettings,
    bank: QuestionBank,

    selected_answer: Option<usize>,
    /// Result of the submitted answer while the explanation is shown
    answer_result: Option<bool>,
    question_started: Instant,

    show_settings: bool,
    report: Option<PerformanceReport>,
    report_format: ReportFormat,

    show_confirmation_dialog: bool,
    allowed_to_close: bool,
    message: Option<String>,
}

fn difficulty_stars(difficulty: u8) -> String {
    let filled = (difficulty as usize).min(5);
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Time left on the question clock, zero once the limit has passed
fn time_remaining(limit_secs: u32, started: Instant, now: Instant) -> Duration {
    Duration::from_secs(limit_secs as u64).saturating_sub(now.saturating_duration_since(started))
}

/// Whether a settings change affects the question clock
fn timer_changed(before: &AppSettings, after: &AppSettings) -> bool {
    before.timed_mode != after.timed_mode || before.time_per_question != after.time_per_question
}

fn title_case(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

impl eframe::App for QuizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        self.render_header(ctx);
        self.render_stats_panel(ctx);
        self.render_quiz_card(ctx);

        if self.show_settings {
            self.render_settings_window(ctx);
        }
        if self.report.is_some() {
            self.render_report_window(ctx);
        }

        if let Some(message) = self.message.clone() {
            egui::Window::new("RustLens")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.message = None;
                    }
                });
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) && !self.allowed_to_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }
    }
}

impl QuizApp {
    pub fn new(
        conn: Connection,
        session: QuizSession,
        settings: AppSettings,
        bank: QuestionBank,
    ) -> Self {
        Self {
            conn,
            session,
            settings,
            bank,
            selected_answer: None,
            answer_result: None,
            question_started: Instant::now(),
            show_settings: false,
            report: None,
            report_format: ReportFormat::Text,
            show_confirmation_dialog: false,
            allowed_to_close: false,
            message: None,
        }
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        let (due, new, scheduled) = self.session.tier_counts(now());

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🦀 RustLens");
                ui.separator();
                ui.label(format!(
                    "{} questions · {} due · {} new · {} scheduled",
                    self.session.question_count(),
                    due,
                    new,
                    scheduled
                ));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                    if ui.button("📊 Report").clicked() {
                        self.open_report();
                    }
                    if ui.button("⟳ Reload questions").clicked() {
                        self.reload_questions();
                    }
                });
            });
        });
    }

    fn render_stats_panel(&mut self, ctx: &egui::Context) {
        let stats = self.session.stats();

        egui::SidePanel::right("stats").min_width(200.0).show(ctx, |ui| {
            ui.heading("Your Progress");
            ui.separator();

            egui::Grid::new("stats_grid").num_columns(2).show(ui, |ui| {
                ui.label("Questions answered");
                ui.strong(stats.total_questions.to_string());
                ui.end_row();
                ui.label("Accuracy");
                ui.strong(format!(
                    "{}%",
                    percent(stats.correct_answers, stats.total_questions)
                ));
                ui.end_row();
                ui.label("Day streak");
                ui.strong(stats.current_streak.to_string());
                ui.end_row();
                ui.label("Longest streak");
                ui.strong(stats.longest_streak.to_string());
                ui.end_row();
            });

            let mut top: Vec<_> = stats
                .category_scores
                .iter()
                .filter(|(_, s)| s.attempted > 0)
                .map(|(c, s)| (c.label(), percent(s.correct, s.attempted), s.attempted))
                .collect();
            top.sort_by(|a, b| b.1.cmp(&a.1));
            top.truncate(3);

            if !top.is_empty() {
                ui.add_space(10.0);
                ui.heading("Top Categories");
                for (label, accuracy, attempted) in top {
                    ui.label(title_case(&label));
                    ui.add(egui::ProgressBar::new(accuracy as f32 / 100.0).text(format!(
                        "{}% ({} questions)",
                        accuracy, attempted
                    )));
                }
            }
        });
    }

    fn render_quiz_card(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(question) = self.session.current_question().cloned() else {
                ui.label(
                    "No questions available. Use 'Reload questions' to import the question bank.",
                );
                return;
            };
            let submitted = self.answer_result.is_some();

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(title_case(&question.category.label())).strong());
                ui.label(difficulty_stars(question.difficulty));
            });

            if self.settings.timed_mode && !submitted {
                let remaining = time_remaining(
                    self.settings.time_per_question,
                    self.question_started,
                    Instant::now(),
                );
                ui.label(format!("⏱ {}s", remaining.as_secs()));
                if remaining.is_zero() {
                    self.submit(TIMED_OUT);
                    return;
                }
                ctx.request_repaint_after(Duration::from_millis(250));
            }

            ui.add_space(10.0);
            egui::ScrollArea::vertical()
                .id_salt("code_block")
                .max_height(260.0)
                .show(ui, |ui| {
                    ui.group(|ui| {
                        ui.set_min_width(ui.available_width());
                        ui.label(egui::RichText::new(&question.code).monospace());
                    });
                });

            ui.add_space(10.0);
            ui.heading(&question.question);
            ui.add_space(10.0);

            // Store actions to execute after UI rendering
            let mut action_select: Option<usize> = None;
            let mut action_submit = false;
            let mut action_next = false;

            for (i, option) in question.options.iter().enumerate() {
                let letter = (b'A' + (i % 26) as u8) as char;
                let mut text = egui::RichText::new(format!("{}  {}", letter, option));
                if submitted && question.is_correct(i) {
                    text = text.color(egui::Color32::from_rgb(80, 200, 120));
                } else if submitted && self.selected_answer == Some(i) {
                    text = text.color(egui::Color32::from_rgb(230, 90, 90));
                }

                let button = ui.add_enabled(
                    !submitted,
                    egui::SelectableLabel::new(self.selected_answer == Some(i), text),
                );
                if button.clicked() {
                    action_select = Some(i);
                }
            }

            ui.add_space(10.0);

            if let Some(correct) = self.answer_result {
                ui.group(|ui| {
                    ui.heading(if correct { "✓ Correct!" } else { "✗ Incorrect" });
                    ui.label(&question.explanation);
                    if let Some(link) = &question.rust_book_link {
                        ui.hyperlink_to("📖 Read more in the Rust Book", link);
                    }
                });
                ui.add_space(10.0);
                if ui.button("Next Question →").clicked() {
                    action_next = true;
                }
            } else if ui
                .add_enabled(self.selected_answer.is_some(), egui::Button::new("Submit Answer"))
                .clicked()
            {
                action_submit = true;
            }

            // Execute deferred actions
            if let Some(i) = action_select {
                self.selected_answer = Some(i);
            }
            if action_submit {
                if let Some(answer) = self.selected_answer {
                    self.submit(answer);
                }
            }
            if action_next {
                self.next_question();
            }
        });
    }

    fn render_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let before = self.settings.clone();

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.checkbox(&mut self.settings.dark_mode, "Dark mode");
                ui.checkbox(&mut self.settings.explanations_enabled, "Show explanations");
                ui.checkbox(&mut self.settings.timed_mode, "Timed mode");
                ui.add_enabled(
                    self.settings.timed_mode,
                    egui::Slider::new(&mut self.settings.time_per_question, 10..=300)
                        .text("seconds per question"),
                );
                ui.checkbox(&mut self.settings.sound_enabled, "Sound");
            });

        self.show_settings = open;
        // The clock only counts time spent under the current limit
        if timer_changed(&before, &self.settings) {
            self.question_started = Instant::now();
        }
        if self.settings != before {
            if let Err(e) = db::update_settings(&self.settings, &self.conn) {
                log::error!("Failed to save settings: {}", e);
                self.message = Some(format!("Failed to save settings: {}", e));
            }
        }
    }

    fn render_report_window(&mut self, ctx: &egui::Context) {
        let Some(report) = &self.report else {
            return;
        };
        let rendered = match self.report_format {
            ReportFormat::Text => format_report_as_text(report, chrono::Utc::now()),
            ReportFormat::Json => format_report_as_json(report).unwrap_or_else(|e| e.to_string()),
        };

        let mut open = true;
        let mut action_download = false;

        egui::Window::new("Performance Report")
            .open(&mut open)
            .default_width(620.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.report_format, ReportFormat::Text, "Text");
                    ui.selectable_value(&mut self.report_format, ReportFormat::Json, "JSON");
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .id_salt("report_text")
                    .max_height(450.0)
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&rendered).monospace());
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("📋 Copy").clicked() {
                        ui.output_mut(|o| o.copied_text = rendered.clone());
                    }
                    if ui.button("💾 Download").clicked() {
                        action_download = true;
                    }
                });
            });

        if action_download {
            self.handle_download(&rendered);
        }
        if !open {
            self.report = None;
        }
    }

    fn submit(&mut self, answer: usize) {
        match self.session.submit_answer(answer, now(), &self.conn) {
            Ok(correct) => {
                if self.settings.explanations_enabled {
                    self.answer_result = Some(correct);
                } else {
                    self.next_question();
                }
            }
            Err(e) => {
                log::error!("Failed to save answer: {}", e);
                self.message = Some(format!("Failed to save answer: {}", e));
            }
        }
    }

    fn next_question(&mut self) {
        self.selected_answer = None;
        self.answer_result = None;
        self.session.next_question(now());
        self.question_started = Instant::now();
    }

    fn open_report(&mut self) {
        match self.session.generate_report(&self.conn) {
            Ok(report) => self.report = Some(report),
            Err(e) => {
                log::error!("Failed to build report: {}", e);
                self.message = Some(format!("Failed to build report: {}", e));
            }
        }
    }

    fn reload_questions(&mut self) {
        match self.session.refresh_questions(&self.bank, now(), &self.conn) {
            Ok(()) => {
                self.selected_answer = None;
                self.answer_result = None;
                self.question_started = Instant::now();
                self.message = Some(format!(
                    "Loaded {} questions",
                    self.session.question_count()
                ));
            }
            Err(e) => {
                log::error!("Failed to reload questions: {}", e);
                self.message = Some(format!("Failed to reload questions: {}", e));
            }
        }
    }

    /// Saves the rendered report through a file dialog
    fn handle_download(&mut self, rendered: &str) {
        let extension = match self.report_format {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        };
        let file_name = format!(
            "rustlens-report-{}.{}",
            now().format("%Y-%m-%d"),
            extension
        );

        let Some(path) = rfd::FileDialog::new()
            .set_file_name(file_name)
            .add_filter("Report", &[extension])
            .save_file()
        else {
            return;
        };

        let result = match path.to_str() {
            Some(path) => export_report_to_path(rendered, path),
            None => Err("path is not valid UTF-8".into()),
        };
        self.message = Some(match result {
            Ok(()) => "Report saved successfully!".to_string(),
            Err(e) => format!("Export failed: {}", e),
        });
    }
}
