//! Threaded recognition pipeline.
//!
//! Implements a multi-station pipeline where each station runs in its own thread,
//! connected by bounded crossbeam channels. The frame gate in front of the
//! first station keeps at most one camera frame in flight.

pub mod error;
pub mod extractor_station;
pub mod orchestrator;
pub mod sink;
pub mod station;
pub mod translator_station;
pub mod types;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use extractor_station::ExtractorStation;
pub use orchestrator::{Pipeline, PipelineConfig, PipelineHandle, Submission};
pub use sink::{CollectorSink, StdoutSink, TextSink};
pub use station::{Station, StationRunner, StationStats};
pub use translator_station::TranslatorStation;
pub use types::{SinkEvent, StageJob};
