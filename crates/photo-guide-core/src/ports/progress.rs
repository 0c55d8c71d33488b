//! Progress reporting port for UI integration.

/// Events emitted while the wizard talks to the service.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A photo is being sent.
    Uploading {
        /// File name of the upload.
        file_name: String,
        /// Payload size in bytes.
        bytes: u64,
    },
    /// Waiting for the composition analysis.
    Analyzing,
    /// Analysis arrived.
    Analyzed {
        /// Total score of the analysis.
        total_score: f32,
    },
    /// Waiting for the regenerated image.
    Generating,
    /// Generation finished (successfully or with a reported failure).
    Generated {
        /// Whether the service reported success.
        success: bool,
    },
    /// A request failed.
    Failed {
        /// Message shown to the user.
        message: String,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
