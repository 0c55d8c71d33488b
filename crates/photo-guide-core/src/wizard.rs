//! The upload → analysis → comparison flow.
//!
//! [`Session`] is plain state; [`Wizard`] drives it against a
//! [`CompositionService`] and reports every transition to an optional
//! [`ProgressSink`].

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    CompositionAnalysis, GenerationRequest, GenerationResult, Genre, Strength, Style, Upload,
    ValueError,
};
use crate::ports::{ApiError, CompositionService, ProgressEvent, ProgressSink};

/// Shown when analysis fails without a server explanation.
pub const ANALYSIS_FAILED: &str = "Analysis failed.";
/// Shown when generation fails without a server explanation.
pub const GENERATION_FAILED: &str = "Image generation failed.";

/// Where the user is in the flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
    /// Choosing a photo and a genre.
    #[default]
    Upload,
    /// Reading the score report and editing the prompt.
    Analysis,
    /// Looking at the before/after result.
    Comparison,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::Analysis => "analysis",
            Self::Comparison => "comparison",
        })
    }
}

/// Wizard failure.
#[derive(Debug, Error)]
pub enum WizardError {
    /// Operation not allowed in the current step.
    #[error("cannot {operation} during the {actual} step")]
    WrongStep {
        /// What was attempted.
        operation: &'static str,
        /// Step the session was in.
        actual: Step,
    },
    /// Input rejected before any request was made.
    #[error(transparent)]
    Invalid(#[from] ValueError),
    /// The service call failed; `message` is what the user sees.
    #[error("{message}")]
    Api {
        /// User-facing message.
        message: String,
        /// Underlying failure.
        #[source]
        source: ApiError,
    },
}

/// State of one pass through the flow.
#[derive(Debug, Clone, Default)]
pub struct Session {
    step: Step,
    upload: Option<Upload>,
    genre: Genre,
    analysis: Option<CompositionAnalysis>,
    prompt: String,
    generation: Option<GenerationResult>,
    error: Option<String>,
    loading: bool,
}

impl Session {
    /// Current step.
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Photo being worked on.
    #[must_use]
    pub const fn upload(&self) -> Option<&Upload> {
        self.upload.as_ref()
    }

    /// Genre chosen for the analysis.
    #[must_use]
    pub const fn genre(&self) -> Genre {
        self.genre
    }

    /// Analysis, once received.
    #[must_use]
    pub const fn analysis(&self) -> Option<&CompositionAnalysis> {
        self.analysis.as_ref()
    }

    /// Prompt that will be sent to the generator.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Generation result, once received.
    #[must_use]
    pub const fn generation(&self) -> Option<&GenerationResult> {
        self.generation.as_ref()
    }

    /// Last user-facing error, cleared when a new request starts.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Drives a [`Session`] against a service.
pub struct Wizard<S> {
    service: S,
    session: Session,
    progress: Option<Box<dyn ProgressSink>>,
}

impl<S: CompositionService> Wizard<S> {
    /// Starts a fresh session.
    #[must_use]
    pub fn new(service: S) -> Self {
        Self {
            service,
            session: Session::default(),
            progress: None,
        }
    }

    /// Reports transitions to `sink`.
    #[must_use]
    pub fn with_progress(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Current session state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The service in use.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Uploads `upload` for analysis under `genre`.
    ///
    /// On success the editable prompt is seeded with the expert prompt and
    /// the session moves to [`Step::Analysis`]. On failure it stays in
    /// [`Step::Upload`] with the error recorded.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] outside the upload step, or
    /// [`WizardError::Api`] when the service call fails.
    pub fn analyze(
        &mut self,
        upload: Upload,
        genre: Genre,
    ) -> Result<&CompositionAnalysis, WizardError> {
        self.expect_step(Step::Upload, "analyze")?;

        self.session.error = None;
        self.session.loading = true;
        self.emit(ProgressEvent::Uploading {
            file_name: upload.file_name.clone(),
            bytes: upload.len(),
        });
        self.emit(ProgressEvent::Analyzing);
        info!(file = %upload.file_name, %genre, "Requesting composition analysis");

        let outcome = self.service.analyze(&upload, genre);
        self.session.loading = false;
        self.session.upload = Some(upload);
        self.session.genre = genre;

        match outcome {
            Ok(analysis) => {
                debug!(
                    score = analysis.total_score,
                    rules = analysis.rules.len(),
                    "Analysis received"
                );
                self.emit(ProgressEvent::Analyzed {
                    total_score: analysis.total_score,
                });
                self.session.prompt.clone_from(&analysis.expert_prompt);
                self.session.step = Step::Analysis;
                Ok(self.session.analysis.insert(analysis))
            }
            Err(source) => Err(self.fail(ANALYSIS_FAILED, source)),
        }
    }

    /// Replaces the prompt that will be sent to the generator.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] outside the analysis step.
    pub fn edit_prompt(&mut self, prompt: impl Into<String>) -> Result<(), WizardError> {
        self.expect_step(Step::Analysis, "edit the prompt")?;
        self.session.prompt = prompt.into();
        Ok(())
    }

    /// Sends the original photo with the edited prompt for regeneration.
    ///
    /// A response with `success: false` still moves to
    /// [`Step::Comparison`]; the comparison view presents the failure.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] outside the analysis step,
    /// [`WizardError::Invalid`] for a blank prompt, or
    /// [`WizardError::Api`] when the service call fails.
    pub fn generate(
        &mut self,
        style: Style,
        strength: Strength,
    ) -> Result<&GenerationResult, WizardError> {
        self.expect_step(Step::Analysis, "generate")?;
        let request = GenerationRequest::new(self.session.prompt.clone(), style, strength)?;

        let Some(upload) = self.session.upload.as_ref() else {
            return Err(WizardError::WrongStep {
                operation: "generate",
                actual: Step::Upload,
            });
        };

        self.session.error = None;
        self.session.loading = true;
        self.emit(ProgressEvent::Generating);
        info!(file = %upload.file_name, %style, %strength, "Requesting image generation");

        let outcome = self.service.generate(upload, &request);
        self.session.loading = false;

        match outcome {
            Ok(result) => {
                if !result.success {
                    warn!(error = ?result.error, "Service reported generation failure");
                }
                self.emit(ProgressEvent::Generated {
                    success: result.success,
                });
                self.session.step = Step::Comparison;
                Ok(self.session.generation.insert(result))
            }
            Err(source) => Err(self.fail(GENERATION_FAILED, source)),
        }
    }

    /// Returns to the upload step with everything cleared.
    pub fn reset(&mut self) {
        debug!(from = %self.session.step, "Resetting session");
        self.session = Session::default();
    }

    fn expect_step(&self, expected: Step, operation: &'static str) -> Result<(), WizardError> {
        if self.session.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                operation,
                actual: self.session.step,
            })
        }
    }

    fn fail(&mut self, fallback: &str, source: ApiError) -> WizardError {
        let message = source.detail().unwrap_or(fallback).to_string();
        warn!(error = %source, "{message}");
        self.session.error = Some(message.clone());
        self.emit(ProgressEvent::Failed {
            message: message.clone(),
        });
        WizardError::Api { message, source }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sink) = &self.progress {
            sink.on_event(event);
        }
    }
}
