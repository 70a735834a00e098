//! Extractor station: camera frame → hand landmarks.

use crate::landmarks::{LandmarkFrame, PoseExtractor};
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::StageJob;
use crate::session::Session;
use std::sync::Arc;

/// Runs the pose extractor on admitted frames.
///
/// A frame without a detected hand (or one the extractor failed on) ends
/// here; its gate slot is released so the next camera frame can be admitted.
pub struct ExtractorStation<E: PoseExtractor> {
    extractor: E,
    session: Arc<Session>,
    verbosity: u8,
    no_hand: u64,
}

impl<E: PoseExtractor> ExtractorStation<E> {
    pub fn new(extractor: E, session: Arc<Session>) -> Self {
        Self {
            extractor,
            session,
            verbosity: 0,
            no_hand: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}

impl<E: PoseExtractor> Station for ExtractorStation<E> {
    type Input = StageJob<E::Image>;
    type Output = StageJob<LandmarkFrame>;

    fn name(&self) -> &'static str {
        self.extractor.name()
    }

    fn process(&mut self, job: Self::Input) -> Result<Option<Self::Output>, StationError> {
        let (admission, image) = match job {
            StageJob::Reset => return Ok(Some(StageJob::Reset)),
            StageJob::Frame { admission, payload } => (admission, payload),
        };

        match self.extractor.extract(image) {
            Ok(Some(frame)) => Ok(Some(StageJob::frame(admission, frame))),
            Ok(None) => {
                self.no_hand += 1;
                self.session.abandon(admission);
                Ok(None)
            }
            Err(e) => {
                self.session.abandon(admission);
                Err(StationError::Recoverable(format!("landmark extraction failed: {e}")))
            }
        }
    }

    fn shutdown(&mut self) {
        if self.verbosity >= 2 {
            eprintln!(
                "signtype: {} finished, {} frame(s) without a hand",
                self.extractor.name(),
                self.no_hand
            );
        }
    }
}
