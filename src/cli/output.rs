use console::{style, Color};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::ai::{EffectivenessScore, ScoreGrade, ScoreSource};
use crate::framework::{Framework, SuggestedVariable};

pub struct OutputFormatter {
    use_colors: bool,
}

/// Stderr spinner shown while waiting on the network.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "]),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}

impl OutputFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn format_score(&self, score: &EffectivenessScore) -> String {
        let mut output = String::new();

        let total = format!("Effectiveness: {}/100", score.total_score);
        output.push_str(&self.style_text(&total, grade_color(score.grade())));
        if score.source == Some(ScoreSource::Heuristic) {
            output.push_str(&self.style_text(" (estimated)", Color::White));
        }
        output.push('\n');

        for (label, detail) in score.breakdown.categories() {
            let line = format!("  {label:<15} {:>2}/25", detail.score);
            output.push_str(&self.style_text(
                &line,
                grade_color(ScoreGrade::for_category(detail.score)),
            ));
            output.push('\n');
            output.push_str(&format!("    {}\n", detail.reasoning));
            output.push_str(&self.style_text(&format!("    → {}", detail.improvement), Color::Cyan));
            output.push('\n');
        }

        if !score.overall_suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &score.overall_suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output.trim_end().to_string()
    }

    pub fn format_suggestions(&self, suggestions: &[SuggestedVariable]) -> String {
        if suggestions.is_empty() {
            return self.style_text("No suggestions found.", Color::Yellow);
        }

        let mut output = String::new();

        for (i, suggestion) in suggestions.iter().enumerate() {
            let number = format!("{}. ", i + 1);
            output.push_str(&self.style_text(&number, Color::Cyan));
            output.push_str(&self.style_text(&suggestion.variable_name, Color::Green));
            output.push_str(&format!(
                " ← \"{}\" (default: \"{}\")",
                suggestion.original_text, suggestion.default_value
            ));
            output.push('\n');

            if !suggestion.hint.is_empty() {
                output.push_str(&self.style_text(&format!("   {}", suggestion.hint), Color::White));
                output.push('\n');
            }
        }

        output.trim_end().to_string()
    }

    pub fn format_frameworks(&self, frameworks: &[&Framework]) -> String {
        if frameworks.is_empty() {
            return self.style_text("No frameworks found.", Color::Yellow);
        }

        frameworks
            .iter()
            .map(|framework| {
                let names: Vec<&str> = framework.variables.keys().map(String::as_str).collect();
                format!(
                    "{} ({})",
                    self.style_text(&framework.name, Color::Green),
                    names.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_error(&self, message: &str) -> String {
        format!("{} {}", self.style_text("Error:", Color::Red), message)
    }

    pub fn format_success(&self, message: &str) -> String {
        format!("{} {}", self.style_text("✓", Color::Green), message)
    }

    pub fn format_warning(&self, message: &str) -> String {
        format!("{} {}", self.style_text("⚠", Color::Yellow), message)
    }

    pub fn format_info(&self, message: &str) -> String {
        format!("{} {}", self.style_text("ℹ", Color::Blue), message)
    }

    fn style_text(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            style(text).fg(color).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

fn grade_color(grade: ScoreGrade) -> Color {
    match grade {
        ScoreGrade::Strong => Color::Green,
        ScoreGrade::Fair => Color::Yellow,
        ScoreGrade::Weak => Color::Red,
    }
}
