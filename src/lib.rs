//! signtype - fingerspelling to text from hand landmarks
//!
//! Turns a stream of detected hand poses into accumulated text: landmarks are
//! normalized, classified into a symbol, debounced and appended, with a
//! single-slot gate keeping at most one camera frame in flight.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod accumulator;
pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod clock;
pub mod config;
pub mod defaults;
pub mod error;
pub mod gate;
pub mod labels;
pub mod landmarks;
pub mod pipeline;
pub mod session;

// Composition root
#[cfg(feature = "cli")]
pub mod app;

// Core traits (extractor → classifier → sink)
pub use classifier::Classifier;
pub use landmarks::PoseExtractor;
pub use pipeline::sink::{CollectorSink, StdoutSink, TextSink};

// Session
pub use session::{Session, SessionConfig, SessionError, SessionEvent, StepOutcome};

// Pipeline
pub use pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle, Submission};

// Error handling
pub use error::{Result, SigntypeError};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use pipeline::error::{ErrorReporter, StationError};
pub use pipeline::station::Station;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
