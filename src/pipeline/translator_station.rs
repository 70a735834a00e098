//! Translator station: hand landmarks → accepted symbols.

use crate::landmarks::LandmarkFrame;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{SinkEvent, StageJob};
use crate::session::{Session, StepOutcome};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Completes admitted frames through the session and forwards newly
/// accepted symbols.
///
/// Per-frame problems the session absorbs (malformed hands, unknown labels,
/// stale results) produce no output and no report. Errors the session
/// surfaces are reported; an input length violation stops the station.
pub struct TranslatorStation {
    session: Arc<Session>,
    running: Arc<AtomicBool>,
    verbosity: u8,
}

impl TranslatorStation {
    pub fn new(session: Arc<Session>, running: Arc<AtomicBool>) -> Self {
        Self {
            session,
            running,
            verbosity: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}

impl Station for TranslatorStation {
    type Input = StageJob<LandmarkFrame>;
    type Output = SinkEvent;

    fn name(&self) -> &'static str {
        "translator"
    }

    fn process(&mut self, job: Self::Input) -> Result<Option<SinkEvent>, StationError> {
        let (admission, frame) = match job {
            StageJob::Reset => return Ok(Some(SinkEvent::Reset)),
            StageJob::Frame { admission, payload } => (admission, payload),
        };

        match self.session.complete(admission, frame) {
            Ok(StepOutcome::Accepted { symbol, text }) => {
                Ok(Some(SinkEvent::Symbol { symbol, text }))
            }
            Ok(outcome) => {
                if self.verbosity >= 2 {
                    eprintln!("signtype: frame outcome {outcome:?}");
                }
                Ok(None)
            }
            Err(e) if e.is_surfaced() || e.is_fatal() => Err(e.into()),
            Err(_) => Ok(None),
        }
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
