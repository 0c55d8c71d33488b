//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod composition_service;
mod progress;
mod report_output;

pub use composition_service::{ApiError, CompositionService, HealthStatus};
pub use progress::{ProgressEvent, ProgressSink};
pub use report_output::ReportOutput;
