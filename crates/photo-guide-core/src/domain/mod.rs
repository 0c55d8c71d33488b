//! Core domain types for photo composition feedback.

mod analysis;
mod generation;
mod genre;
pub mod grade;
mod upload;

pub use analysis::{CompositionAnalysis, RuleScore, MAX_SCORE, MIN_SCORE};
pub use generation::{
    GenerationOutcome, GenerationRequest, GenerationResult, Strength, Style,
    DEFAULT_FAILURE_REASON,
};
pub use genre::Genre;
pub use grade::{ScoreTier, Verdict};
pub use upload::{
    content_type_for, ImageDimensions, Upload, UploadError, UploadPolicy, DEFAULT_EXTENSIONS,
    DEFAULT_MAX_BYTES,
};

use thiserror::Error;

/// A value that does not fit its domain.
#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    /// Genre string not recognised.
    #[error("unknown genre '{0}' (expected one of: portrait, landscape, product)")]
    UnknownGenre(String),
    /// Style string not recognised.
    #[error("unknown style '{0}' (expected one of: natural, vivid, dramatic)")]
    UnknownStyle(String),
    /// Strength outside `0.0..=1.0`.
    #[error("strength {0} is not in 0.0..=1.0")]
    StrengthOutOfRange(f32),
    /// Score outside `0..=100`.
    #[error("score for '{field}' is out of range: {value}")]
    ScoreOutOfRange {
        /// Which score.
        field: String,
        /// The value received.
        value: f32,
    },
    /// Blank generation prompt.
    #[error("prompt must not be empty")]
    EmptyPrompt,
}
