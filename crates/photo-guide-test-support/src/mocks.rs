//! Mock implementations of core port traits.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use photo_guide_core::domain::{
    CompositionAnalysis, GenerationRequest, GenerationResult, Genre, Upload,
};
use photo_guide_core::ports::{
    ApiError, CompositionService, HealthStatus, ProgressEvent, ProgressSink, ReportOutput,
};

use crate::builders::{AnalysisBuilder, GenerationBuilder};

/// A call received by [`MockCompositionService`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    /// `analyze` with the uploaded file name and genre.
    Analyze {
        /// File name of the upload.
        file_name: String,
        /// Requested genre.
        genre: Genre,
    },
    /// `generate` with the uploaded file name and request.
    Generate {
        /// File name of the upload.
        file_name: String,
        /// Request as sent.
        request: GenerationRequest,
    },
    /// `health`.
    Health,
    /// `fetch_image` with the requested URL.
    FetchImage {
        /// URL requested.
        url: String,
    },
}

type Scripted<T> = Arc<Mutex<VecDeque<Result<T, ApiError>>>>;

/// Mock implementation of `CompositionService` for testing.
///
/// Replies come from per-operation queues; when a queue is empty a default
/// reply is used. Every call is recorded for assertions.
#[derive(Clone, Default)]
pub struct MockCompositionService {
    analyses: Scripted<CompositionAnalysis>,
    generations: Scripted<GenerationResult>,
    images: Scripted<Vec<u8>>,
    calls: Arc<Mutex<Vec<ServiceCall>>>,
}

impl MockCompositionService {
    /// Creates a mock with empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next `analyze` call.
    #[must_use]
    pub fn with_analysis(self, reply: Result<CompositionAnalysis, ApiError>) -> Self {
        push(&self.analyses, reply);
        self
    }

    /// Queues a reply for the next `generate` call.
    #[must_use]
    pub fn with_generation(self, reply: Result<GenerationResult, ApiError>) -> Self {
        push(&self.generations, reply);
        self
    }

    /// Queues a reply for the next `fetch_image` call.
    #[must_use]
    pub fn with_image(self, reply: Result<Vec<u8>, ApiError>) -> Self {
        push(&self.images, reply);
        self
    }

    /// Returns all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `analyze` calls.
    #[must_use]
    pub fn analyze_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ServiceCall::Analyze { .. }))
            .count()
    }

    /// Returns the number of `generate` calls.
    #[must_use]
    pub fn generate_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ServiceCall::Generate { .. }))
            .count()
    }

    /// Returns the last request passed to `generate`, if any.
    #[must_use]
    pub fn last_generation_request(&self) -> Option<GenerationRequest> {
        self.calls().into_iter().rev().find_map(|c| match c {
            ServiceCall::Generate { request, .. } => Some(request),
            _ => None,
        })
    }

    fn record(&self, call: ServiceCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

fn push<T>(queue: &Scripted<T>, reply: Result<T, ApiError>) {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(reply);
}

fn pop<T>(queue: &Scripted<T>) -> Option<Result<T, ApiError>> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

impl CompositionService for MockCompositionService {
    fn analyze(&self, upload: &Upload, genre: Genre) -> Result<CompositionAnalysis, ApiError> {
        self.record(ServiceCall::Analyze {
            file_name: upload.file_name.clone(),
            genre,
        });
        pop(&self.analyses).unwrap_or_else(|| Ok(AnalysisBuilder::new().genre(genre).build()))
    }

    fn generate(
        &self,
        upload: &Upload,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ApiError> {
        self.record(ServiceCall::Generate {
            file_name: upload.file_name.clone(),
            request: request.clone(),
        });
        pop(&self.generations)
            .unwrap_or_else(|| Ok(GenerationBuilder::image("/outputs/mock_output.jpg").build()))
    }

    fn health(&self) -> Result<HealthStatus, ApiError> {
        self.record(ServiceCall::Health);
        Ok(HealthStatus {
            status: "healthy".into(),
            service: Some("mock".into()),
        })
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        self.record(ServiceCall::FetchImage { url: url.into() });
        pop(&self.images).unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Mock implementation of `ReportOutput` for testing.
///
/// Captures what would have been rendered.
#[derive(Clone, Default)]
pub struct MockReportOutput {
    analyses: Arc<Mutex<Vec<CompositionAnalysis>>>,
    generations: Arc<Mutex<Vec<GenerationResult>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockReportOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured analyses.
    #[must_use]
    pub fn analyses(&self) -> Vec<CompositionAnalysis> {
        self.analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns all captured generation results.
    #[must_use]
    pub fn generations(&self) -> Vec<GenerationResult> {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportOutput for MockReportOutput {
    fn write_analysis(
        &self,
        _upload: &Upload,
        analysis: &CompositionAnalysis,
    ) -> anyhow::Result<()> {
        self.analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(analysis.clone());
        Ok(())
    }

    fn write_generation(&self, _upload: &Upload, result: &GenerationResult) -> anyhow::Result<()> {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions. Clones share the same buffer, so a
/// clone can be boxed into a wizard while the test keeps the original.
#[derive(Clone, Default)]
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Failed` events.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Failed { .. }))
            .count()
    }

    /// Returns the message of the last `Failed` event, if any.
    #[must_use]
    pub fn last_failure(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            ProgressEvent::Failed { message } => Some(message),
            _ => None,
        })
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use photo_guide_core::domain::{Strength, Style};

    #[test]
    fn test_mock_service_defaults() {
        let service = MockCompositionService::new();
        let upload = Upload::new("a.jpg", vec![1]);

        let analysis = service.analyze(&upload, Genre::Product).unwrap();
        assert_eq!(analysis.genre, Genre::Product);
        assert!(service.health().unwrap().is_healthy());
        assert_eq!(service.analyze_count(), 1);
        assert_eq!(service.calls().len(), 2);
    }

    #[test]
    fn test_mock_service_scripted_replies_in_order() {
        let service = MockCompositionService::new()
            .with_analysis(Err(ApiError::Transport("down".into())))
            .with_analysis(Ok(AnalysisBuilder::new().total_score(91.0).build()));
        let upload = Upload::new("a.jpg", vec![1]);

        assert!(service.analyze(&upload, Genre::Portrait).is_err());
        let second = service.analyze(&upload, Genre::Portrait).unwrap();
        assert!((second.total_score - 91.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_mock_service_records_generation_request() {
        let service = MockCompositionService::new();
        let upload = Upload::new("a.jpg", vec![1]);
        let request = GenerationRequest::new("warmer", Style::Vivid, Strength::DEFAULT).unwrap();

        service.generate(&upload, &request).unwrap();

        assert_eq!(service.generate_count(), 1);
        assert_eq!(service.last_generation_request(), Some(request));
    }

    #[test]
    fn test_mock_report_output() {
        let output = MockReportOutput::new();
        let upload = Upload::new("a.jpg", vec![1]);

        output
            .write_analysis(&upload, &AnalysisBuilder::new().build())
            .unwrap();
        output.flush().unwrap();

        assert_eq!(output.analyses().len(), 1);
        assert!(output.generations().is_empty());
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink_shared_between_clones() {
        let sink = MockProgressSink::new();
        let clone = sink.clone();

        clone.on_event(ProgressEvent::Analyzing);
        clone.on_event(ProgressEvent::Failed {
            message: "nope".into(),
        });

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.failed_count(), 1);
        assert_eq!(sink.last_failure().as_deref(), Some("nope"));
    }
}
