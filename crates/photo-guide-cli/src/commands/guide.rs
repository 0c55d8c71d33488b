//! Guide command - the full upload, analysis and comparison flow.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use clap::Args;
use photo_guide_core::Wizard;
use tracing::{debug, info};

use super::analyze::{analyze_step, AnalysisOpts};
use super::generate::{present_generation, GenerationOpts};
use super::{CommonArgs, ExitCode};
use crate::config::AppConfig;

/// Arguments for the guided flow.
#[derive(Args, Clone, Default)]
pub struct GuideArgs {
    /// Photo to improve (jpg, jpeg, png, webp)
    pub path: Option<PathBuf>,

    /// Analysis options
    #[command(flatten)]
    pub analysis: AnalysisOpts,

    /// Generation options
    #[command(flatten)]
    pub generation: GenerationOpts,

    /// Edit the suggested prompt in $EDITOR before generating
    #[arg(long, conflicts_with_all = ["prompt", "prompt_file"])]
    pub edit: bool,

    /// Stop after the analysis
    #[arg(long)]
    pub no_generate: bool,

    /// Connection and output options
    #[command(flatten)]
    pub common: CommonArgs,
}

impl GuideArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.analysis = self.analysis.with_config(config);
        self.generation = self.generation.with_config(config);
        self.common = self.common.with_config(config);
        self
    }
}

/// Run the guided flow.
pub fn run(args: &GuideArgs) -> Result<ExitCode> {
    let path = args
        .path
        .as_deref()
        .context("No photo specified. Use --help for usage information.")?;

    let client = args.common.client()?;
    let mut wizard = Wizard::new(client).with_progress(Box::new(args.common.spinner()));

    let analysis_output = args.common.report_output(args.analysis.guide);
    let total = analyze_step(
        &mut wizard,
        path,
        &args.analysis,
        &args.common,
        analysis_output.as_ref(),
    )?;
    let analysis_code = args.analysis.exit_code_for(total);

    if args.no_generate {
        return Ok(analysis_code);
    }

    if let Some(prompt) = args.generation.prompt_override()? {
        wizard.edit_prompt(prompt)?;
    } else if args.edit {
        let edited = edit_in_editor(wizard.session().prompt())?;
        wizard.edit_prompt(edited)?;
    }
    debug!(prompt = wizard.session().prompt(), "Prompt ready");

    wizard.generate(args.generation.style(), args.generation.strength()?)?;

    let session = wizard.session();
    let (Some(upload), Some(result)) = (session.upload(), session.generation()) else {
        anyhow::bail!("Generation finished without a result");
    };
    let comparison_output = args.common.report_output(false);
    let generation_code = present_generation(
        wizard.service(),
        upload,
        result,
        comparison_output.as_ref(),
        args.generation.output.as_deref(),
        args.common.quiet,
    )?;

    Ok(analysis_code.max(generation_code))
}

const EDITOR_HEADER: &str = "\
# Edit the instructions for the image generator.
# Lines starting with '#' are ignored.
";

/// Opens `prompt` in `$VISUAL` or `$EDITOR` and returns the edited text.
fn edit_in_editor(prompt: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("photo-guide-prompt-")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create prompt file")?;
    writeln!(file, "{EDITOR_HEADER}{prompt}")?;
    file.flush()?;

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    info!("Opening prompt in {program}");

    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{program}'"))?;
    if !status.success() {
        anyhow::bail!("Editor exited with {status}");
    }

    let text = std::fs::read_to_string(file.path()).context("Failed to read edited prompt")?;
    Ok(strip_comments(&text))
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments() {
        let text = "# header\n# more\nBrighten the face.\n\nCrop tighter.\n";
        assert_eq!(strip_comments(text), "Brighten the face.\n\nCrop tighter.");
    }

    #[test]
    fn test_strip_comments_all_comments() {
        assert_eq!(strip_comments(EDITOR_HEADER), "");
    }
}
