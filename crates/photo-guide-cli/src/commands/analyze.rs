//! Analyze command - upload a photo and report its composition score.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use photo_guide_adapters::{load_upload, HttpClient};
use photo_guide_core::{Genre, ReportOutput, Wizard};
use tracing::info;

use super::{parse_genre, parse_score, CommonArgs, ExitCode};
use crate::config::AppConfig;

/// Options for the analysis step, shared with `guide`.
#[derive(Args, Clone, Default)]
pub struct AnalysisOpts {
    /// Photo genre: portrait, landscape or product
    #[arg(long, value_parser = parse_genre)]
    pub genre: Option<Genre>,

    /// Expand the coach guide
    #[arg(long)]
    pub guide: bool,

    /// Exit with status 1 when the total score is below this (0-100)
    #[arg(long, value_name = "SCORE", value_parser = parse_score)]
    pub fail_under: Option<f32>,
}

impl AnalysisOpts {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.genre = self.genre.or_else(|| config.genre());
        if !self.guide {
            self.guide = config.analysis.show_guide.unwrap_or(false);
        }
        self.fail_under = self.fail_under.or(config.analysis.fail_under);
        self
    }

    /// Genre with fallback to portrait.
    pub fn genre(&self) -> Genre {
        self.genre.unwrap_or_default()
    }

    /// Exit code for a total score.
    pub fn exit_code_for(&self, total_score: f32) -> ExitCode {
        match self.fail_under {
            Some(min) if total_score < min => ExitCode::BelowTarget,
            _ => ExitCode::Success,
        }
    }
}

/// Arguments for the analyze command.
#[derive(Args, Clone)]
pub struct AnalyzeArgs {
    /// Photo to analyze (jpg, jpeg, png, webp)
    pub path: Option<PathBuf>,

    /// Analysis options
    #[command(flatten)]
    pub analysis: AnalysisOpts,

    /// Write the suggested generation prompt to this file
    #[arg(long, value_name = "FILE")]
    pub prompt_out: Option<PathBuf>,

    /// Connection and output options
    #[command(flatten)]
    pub common: CommonArgs,
}

impl AnalyzeArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.analysis = self.analysis.with_config(config);
        self.common = self.common.with_config(config);
        self
    }
}

/// Run the analyze command.
pub fn run(args: &AnalyzeArgs) -> Result<ExitCode> {
    let path = args
        .path
        .as_deref()
        .context("No photo specified. Use --help for usage information.")?;

    let mut wizard =
        Wizard::new(args.common.client()?).with_progress(Box::new(args.common.spinner()));
    let output = args.common.report_output(args.analysis.guide);
    let total = analyze_step(&mut wizard, path, &args.analysis, &args.common, output.as_ref())?;

    if let Some(ref prompt_out) = args.prompt_out {
        let prompt = wizard
            .session()
            .analysis()
            .map(|a| a.expert_prompt.as_str())
            .unwrap_or_default();
        std::fs::write(prompt_out, prompt)
            .with_context(|| format!("Failed to write {}", prompt_out.display()))?;
        info!("Wrote prompt to {}", prompt_out.display());
    }

    Ok(args.analysis.exit_code_for(total))
}

/// Loads `path`, runs the analysis step and renders the report.
///
/// Returns the total score.
pub fn analyze_step(
    wizard: &mut Wizard<HttpClient>,
    path: &Path,
    opts: &AnalysisOpts,
    common: &CommonArgs,
    output: &dyn ReportOutput,
) -> Result<f32> {
    let upload = load_upload(path, &common.upload_policy())?;
    wizard.analyze(upload, opts.genre())?;

    let session = wizard.session();
    let (Some(upload), Some(analysis)) = (session.upload(), session.analysis()) else {
        anyhow::bail!("Analysis finished without a result");
    };

    output.write_analysis(upload, analysis)?;
    output.flush()?;
    Ok(analysis.total_score)
}
