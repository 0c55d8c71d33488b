//! Test support utilities for photo-guide.
//!
//! Provides mocks, fixture builders and a stub backend for testing the
//! photo-guide client without a real composition service.
//!
//! # Example
//!
//! ```
//! use photo_guide_test_support::{AnalysisBuilder, MockCompositionService, SyntheticUpload};
//!
//! let analysis = AnalysisBuilder::new().total_score(88.0).build();
//! let service = MockCompositionService::new().with_analysis(Ok(analysis));
//! let upload = SyntheticUpload::png("portrait.png", 64, 48);
//! ```

mod builders;
mod mocks;
mod stub_server;

pub use builders::{AnalysisBuilder, GenerationBuilder, SyntheticUpload};
pub use mocks::{MockCompositionService, MockProgressSink, MockReportOutput, ServiceCall};
pub use stub_server::{
    RecordedField, RecordedRequest, StubBackend, StubReply, ANALYZE_PATH, GENERATE_PATH,
};
