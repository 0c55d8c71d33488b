//! Report output port for rendering what the service returned.

use crate::domain::{CompositionAnalysis, GenerationResult, Upload};

/// Port for presenting analysis and generation results.
pub trait ReportOutput: Send + Sync {
    /// Presents an analysis of `upload`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_analysis(&self, upload: &Upload, analysis: &CompositionAnalysis) -> anyhow::Result<()>;

    /// Presents a generation result next to the original `upload`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_generation(&self, upload: &Upload, result: &GenerationResult) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
