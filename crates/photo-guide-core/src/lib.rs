//! Photo Guide Core - Domain logic for composition feedback
//!
//! This crate contains the domain types exchanged with the composition
//! service, the rules for presenting scores, the wizard flow, and the ports
//! adapters plug into.

pub mod domain;
pub mod ports;
pub mod wizard;

pub use domain::{
    CompositionAnalysis, GenerationOutcome, GenerationRequest, GenerationResult, Genre,
    ImageDimensions, RuleScore, ScoreTier, Strength, Style, Upload, UploadError, UploadPolicy,
    ValueError, Verdict,
};
pub use ports::{
    ApiError, CompositionService, HealthStatus, ProgressEvent, ProgressSink, ReportOutput,
};
pub use wizard::{Session, Step, Wizard, WizardError};
