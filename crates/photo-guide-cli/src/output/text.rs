//! Human-readable report output.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use photo_guide_core::domain::grade::{format_rule, format_total};
use photo_guide_core::{
    CompositionAnalysis, GenerationOutcome, GenerationResult, ReportOutput, ScoreTier, Upload,
    Verdict,
};

/// Plain-text report writer.
pub struct TextOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    show_guide: bool,
}

impl TextOutput {
    /// Creates a text output writing to stdout.
    #[must_use]
    pub fn stdout(show_guide: bool) -> Self {
        Self::new(Box::new(io::stdout()), show_guide)
    }

    /// Creates a text output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, show_guide: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            show_guide,
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    fn emit(&self, text: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }
}

impl ReportOutput for TextOutput {
    fn write_analysis(&self, upload: &Upload, analysis: &CompositionAnalysis) -> Result<()> {
        self.emit(&render_analysis(upload, analysis, self.show_guide))
    }

    fn write_generation(&self, upload: &Upload, result: &GenerationResult) -> Result<()> {
        self.emit(&render_comparison(upload, result))
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

/// Renders the score report for one analysis.
pub fn render_analysis(
    upload: &Upload,
    analysis: &CompositionAnalysis,
    show_guide: bool,
) -> String {
    let mut out = String::new();

    let _ = write!(out, "{}", upload.file_name);
    if let Some(dims) = upload.dimensions {
        let _ = write!(out, " ({dims})");
    }
    let _ = writeln!(out, " - {}", analysis.genre.label());
    out.push('\n');

    let tier = ScoreTier::of(analysis.total_score);
    let _ = writeln!(
        out,
        "  Composition score: {} / 100  {} {}",
        format_total(analysis.total_score),
        tier.marker(),
        Verdict::of(analysis.total_score).label()
    );

    if !analysis.rules.is_empty() {
        out.push('\n');
        let width = analysis
            .rules
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0);
        for rule in &analysis.rules {
            let _ = writeln!(
                out,
                "  {} {:<width$}  {:>3}  {}",
                ScoreTier::of(rule.score).marker(),
                rule.name,
                format_rule(rule.score),
                rule.message,
            );
            if !rule.suggestion.is_empty() {
                let _ = writeln!(out, "       -> {}", rule.suggestion);
            }
        }
    }

    out.push('\n');
    let has_guide = !analysis.coach_guide.trim().is_empty();
    if has_guide && show_guide {
        out.push_str("Coach guide\n");
        push_indented(&mut out, &analysis.coach_guide);
    } else if has_guide {
        out.push_str("Coach guide: hidden, run with --guide to expand\n");
    }

    if !analysis.expert_prompt.trim().is_empty() {
        out.push_str("\nSuggested prompt\n");
        push_indented(&mut out, &analysis.expert_prompt);
    }
    out
}

/// Renders the before/after comparison for a generation result.
pub fn render_comparison(upload: &Upload, result: &GenerationResult) -> String {
    let mut out = String::new();
    match result.outcome() {
        GenerationOutcome::Image { url } => {
            let _ = writeln!(out, "Before: {}", upload.file_name);
            let _ = writeln!(out, "After:  {url}");
        }
        GenerationOutcome::Suggestions { text, note } => {
            out.push_str("No image was generated. Suggestions:\n");
            if text.trim().is_empty() {
                out.push_str("  (none)\n");
            } else {
                push_indented(&mut out, text);
            }
            if let Some(note) = note {
                let _ = writeln!(out, "Note: {note}");
            }
        }
        GenerationOutcome::Failed { reason } => {
            let _ = writeln!(out, "Generation failed: {reason}");
        }
    }
    out
}

fn push_indented(out: &mut String, text: &str) {
    for line in text.trim_end().lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "  {line}");
        }
    }
}
