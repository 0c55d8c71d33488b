//! CLI command definitions and handlers.

pub mod analyze;
pub mod generate;
pub mod guide;
pub mod health;

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use photo_guide_adapters::{ClientConfig, HttpClient, DEFAULT_API_PREFIX, DEFAULT_BASE_URL};
use photo_guide_core::{Genre, ReportOutput, Style, UploadPolicy};

use crate::config::AppConfig;
use crate::output::{JsonOutput, Spinner, TextOutput};

/// Photo Guide - composition feedback and AI touch-ups for your photos
#[derive(Parser)]
#[command(name = "photo-guide")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Full guided flow (the default when no subcommand is given).
    #[command(flatten)]
    pub guide: guide::GuideArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Upload a photo and show its composition score
    Analyze(analyze::AnalyzeArgs),
    /// Regenerate a photo from improvement instructions
    Generate(generate::GenerateArgs),
    /// Analyze, edit the prompt, regenerate and compare
    Guide(guide::GuideArgs),
    /// Check that the composition service is reachable
    Health(health::HealthArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExitCode {
    /// Everything went fine.
    Success = 0,
    /// Score below `--fail-under`, or the service reported a failed generation.
    BelowTarget = 1,
    /// Something went wrong.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// One JSON object per report
    Json,
}

/// Hardcoded defaults.
mod defaults {
    pub const TIMEOUT_SECS: u64 = 30;
    pub const GENERATION_TIMEOUT_SECS: u64 = 120;
}

/// Parse a genre name.
pub fn parse_genre(s: &str) -> Result<Genre, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Parse a style preset name.
pub fn parse_style(s: &str) -> Result<Style, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Parse and validate a strength value (0.0-1.0).
pub fn parse_strength(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse and validate a score value (0-100).
pub fn parse_score(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..=100"))
    }
}

/// Parse a timeout in whole seconds; zero is rejected.
pub fn parse_timeout(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("timeout must be at least 1 second".to_string()),
        Ok(secs) => Ok(secs),
        Err(_) => Err(format!("'{s}' is not a whole number of seconds")),
    }
}

/// Connection and output arguments shared by every command.
#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    /// Composition service URL
    #[arg(long, value_name = "URL", env = "PHOTO_GUIDE_SERVER")]
    pub server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Show progress spinner
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: AppConfig,
}

impl CommonArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. `PHOTO_GUIDE_SERVER` and CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if self.server.is_none() {
            self.server.clone_from(&config.server.url);
        }
        if self.timeout.is_none() {
            self.timeout = config.server.timeout_secs.filter(|&secs| secs > 0);
        }
        if self.format.is_none() {
            self.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "text" => Some(OutputFormat::Text),
                    "json" => Some(OutputFormat::Json),
                    _ => None,
                });
        }
        if !self.pretty {
            self.pretty = config.output.pretty.unwrap_or(false);
        }
        if !self.progress {
            self.progress = config.output.progress.unwrap_or(false);
        }
        self.config = config.clone();
        self
    }

    /// Output format with fallback to text.
    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// HTTP client settings.
    pub fn client_config(&self) -> ClientConfig {
        let server = &self.config.server;
        ClientConfig {
            base_url: self
                .server
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_prefix: server
                .api_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            timeout: Duration::from_secs(self.timeout.unwrap_or(defaults::TIMEOUT_SECS)),
            generation_timeout: Duration::from_secs(
                server
                    .generation_timeout_secs
                    .filter(|&secs| secs > 0)
                    .unwrap_or(defaults::GENERATION_TIMEOUT_SECS),
            ),
        }
    }

    /// HTTP client for the configured server.
    pub fn client(&self) -> Result<HttpClient> {
        HttpClient::new(self.client_config())
    }

    /// Upload limits.
    pub fn upload_policy(&self) -> UploadPolicy {
        self.config
            .upload
            .max_size_mb
            .map_or_else(UploadPolicy::default, |mb| {
                UploadPolicy::with_max_bytes(mb.saturating_mul(1024 * 1024))
            })
    }

    /// Report writer on stdout in the selected format.
    pub fn report_output(&self, show_guide: bool) -> Box<dyn ReportOutput> {
        match self.format() {
            OutputFormat::Text => Box::new(TextOutput::stdout(show_guide)),
            OutputFormat::Json => Box::new(JsonOutput::stdout(self.pretty)),
        }
    }

    /// Progress spinner on stderr.
    pub fn spinner(&self) -> Spinner {
        let show_bar = !self.quiet && (self.progress || std::io::stderr().is_terminal());
        Spinner::new(self.quiet, show_bar)
    }
}
