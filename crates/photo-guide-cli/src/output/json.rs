//! JSON output adapter.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use photo_guide_core::{
    CompositionAnalysis, GenerationOutcome, GenerationResult, ReportOutput, ScoreTier, Upload,
    Verdict,
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// One JSON object per report.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    pretty: bool,
}

#[derive(Serialize)]
struct FileInfo<'a> {
    name: &'a str,
    content_type: &'a str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
}

impl<'a> From<&'a Upload> for FileInfo<'a> {
    fn from(upload: &'a Upload) -> Self {
        Self {
            name: &upload.file_name,
            content_type: &upload.content_type,
            size: upload.len(),
            width: upload.dimensions.map(|d| d.width),
            height: upload.dimensions.map(|d| d.height),
        }
    }
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    kind: &'static str,
    file: FileInfo<'a>,
    timestamp: String,
    verdict: Verdict,
    tier: ScoreTier,
    analysis: &'a CompositionAnalysis,
}

#[derive(Serialize)]
struct GenerationReport<'a> {
    kind: &'static str,
    file: FileInfo<'a>,
    timestamp: String,
    outcome: &'static str,
    result: &'a GenerationResult,
}

impl JsonOutput {
    /// Creates a JSON output writing to stdout.
    #[must_use]
    pub fn stdout(pretty: bool) -> Self {
        Self::new(Box::new(io::stdout()), pretty)
    }

    /// Creates a JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, pretty: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty,
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

impl ReportOutput for JsonOutput {
    fn write_analysis(&self, upload: &Upload, analysis: &CompositionAnalysis) -> Result<()> {
        self.emit(&AnalysisReport {
            kind: "analysis",
            file: upload.into(),
            timestamp: now_rfc3339()?,
            verdict: Verdict::of(analysis.total_score),
            tier: ScoreTier::of(analysis.total_score),
            analysis,
        })
    }

    fn write_generation(&self, upload: &Upload, result: &GenerationResult) -> Result<()> {
        let outcome = match result.outcome() {
            GenerationOutcome::Image { .. } => "image",
            GenerationOutcome::Suggestions { .. } => "suggestions",
            GenerationOutcome::Failed { .. } => "failed",
        };
        self.emit(&GenerationReport {
            kind: "generation",
            file: upload.into(),
            timestamp: now_rfc3339()?,
            outcome,
            result,
        })
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

fn now_rfc3339() -> Result<String> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}
