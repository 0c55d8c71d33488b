//! Generate command - regenerate a photo from improvement instructions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use photo_guide_adapters::{load_upload, save_image, HttpClient};
use photo_guide_core::wizard::GENERATION_FAILED;
use photo_guide_core::{
    CompositionService, GenerationOutcome, GenerationRequest, GenerationResult, ProgressEvent,
    ProgressSink, ReportOutput, Strength, Style, Upload,
};
use tracing::{info, warn};

use super::{parse_strength, parse_style, CommonArgs, ExitCode};
use crate::config::AppConfig;

/// Options for the generation step, shared with `guide`.
#[derive(Args, Clone, Default)]
pub struct GenerationOpts {
    /// Improvement instructions for the generator
    #[arg(long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the instructions from a file
    #[arg(long, value_name = "FILE")]
    pub prompt_file: Option<PathBuf>,

    /// Style preset: natural, vivid or dramatic
    #[arg(long, value_parser = parse_style)]
    pub style: Option<Style>,

    /// Modification strength (0.0-1.0)
    #[arg(long, value_parser = parse_strength)]
    pub strength: Option<f32>,

    /// Save the regenerated image to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl GenerationOpts {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.style = self.style.or_else(|| config.style());
        self.strength = self.strength.or(config.generation.strength);
        self
    }

    /// Style with fallback to natural.
    pub fn style(&self) -> Style {
        self.style.unwrap_or_default()
    }

    /// Strength with fallback to the default.
    pub fn strength(&self) -> Result<Strength> {
        match self.strength {
            Some(s) => Ok(Strength::new(s)?),
            None => Ok(Strength::DEFAULT),
        }
    }

    /// Prompt given on the command line or in a file, if any.
    pub fn prompt_override(&self) -> Result<Option<String>> {
        if let Some(ref prompt) = self.prompt {
            return Ok(Some(prompt.clone()));
        }
        if let Some(ref file) = self.prompt_file {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read prompt file {}", file.display()))?;
            return Ok(Some(text.trim_end().to_string()));
        }
        Ok(None)
    }
}

/// Arguments for the generate command.
#[derive(Args, Clone)]
pub struct GenerateArgs {
    /// Original photo (jpg, jpeg, png, webp)
    pub path: Option<PathBuf>,

    /// Generation options
    #[command(flatten)]
    pub generation: GenerationOpts,

    /// Connection and output options
    #[command(flatten)]
    pub common: CommonArgs,
}

impl GenerateArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.generation = self.generation.with_config(config);
        self.common = self.common.with_config(config);
        self
    }
}

/// Run the generate command.
pub fn run(args: &GenerateArgs) -> Result<ExitCode> {
    let path = args
        .path
        .as_deref()
        .context("No photo specified. Use --help for usage information.")?;
    let prompt = args
        .generation
        .prompt_override()?
        .context("No prompt given. Use --prompt or --prompt-file.")?;
    let request =
        GenerationRequest::new(prompt, args.generation.style(), args.generation.strength()?)?;

    let upload = load_upload(path, &args.common.upload_policy())?;
    let client = args.common.client()?;

    let spinner = args.common.spinner();
    spinner.on_event(ProgressEvent::Uploading {
        file_name: upload.file_name.clone(),
        bytes: upload.len(),
    });
    spinner.on_event(ProgressEvent::Generating);
    let result = match client.generate(&upload, &request) {
        Ok(result) => {
            spinner.on_event(ProgressEvent::Generated {
                success: result.success,
            });
            result
        }
        Err(e) => {
            let message = e.detail().unwrap_or(GENERATION_FAILED).to_string();
            spinner.on_event(ProgressEvent::Failed {
                message: message.clone(),
            });
            return Err(anyhow::Error::new(e).context(message));
        }
    };

    let output = args.common.report_output(false);
    present_generation(
        &client,
        &upload,
        &result,
        output.as_ref(),
        args.generation.output.as_deref(),
        args.common.quiet,
    )
}

/// Renders the before/after comparison, then downloads the image if asked.
///
/// Relative image URLs are resolved against the server before display. A
/// failed download is reported on stderr and leaves the comparison intact.
pub fn present_generation(
    client: &HttpClient,
    upload: &Upload,
    result: &GenerationResult,
    output: &dyn ReportOutput,
    download_to: Option<&Path>,
    quiet: bool,
) -> Result<ExitCode> {
    let mut shown = result.clone();
    let (exit_code, download) = match result.outcome() {
        GenerationOutcome::Image { url } => {
            shown.image_url = Some(client.resolve(url)?.to_string());
            (ExitCode::Success, download_to.map(|target| (url, target)))
        }
        GenerationOutcome::Suggestions { .. } => {
            if download_to.is_some() {
                warn!("No image was generated; nothing to save");
            }
            (ExitCode::Success, None)
        }
        GenerationOutcome::Failed { reason } => {
            warn!("Generation failed: {reason}");
            (ExitCode::BelowTarget, None)
        }
    };

    output.write_generation(upload, &shown)?;
    output.flush()?;

    let Some((url, target)) = download else {
        return Ok(exit_code);
    };
    match download_image(client, url, target) {
        Ok(()) => {
            if !quiet {
                eprintln!("Saved {}", target.display());
            }
            Ok(exit_code)
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            Ok(ExitCode::Error)
        }
    }
}

fn download_image(client: &HttpClient, url: &str, target: &Path) -> Result<()> {
    let bytes = client
        .fetch_image(url)
        .with_context(|| format!("Failed to download {url}"))?;
    save_image(target, &bytes)?;
    info!("Saved regenerated image to {}", target.display());
    Ok(())
}
