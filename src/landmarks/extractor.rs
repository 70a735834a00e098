//! Pose extractor boundary.
//!
//! Turning camera pixels into hand landmarks is done by an external model.
//! This trait is the seam the pipeline drives; the crate ships a pass-through
//! implementation for streams whose landmarks were extracted ahead of time.

use crate::defaults;
use crate::error::Result;
use crate::landmarks::LandmarkFrame;

/// Extracts hand landmarks from one camera frame.
///
/// This trait allows swapping implementations (a real hand landmarker vs a
/// recorded stream).
pub trait PoseExtractor: Send + 'static {
    /// Camera frame type accepted by the extractor.
    type Image: Send + 'static;

    /// Returns the landmarks of the detected hand, or `None` when no hand
    /// was detected.
    fn extract(&mut self, image: Self::Image) -> Result<Option<LandmarkFrame>>;

    /// Name for logging.
    fn name(&self) -> &'static str {
        "extractor"
    }
}

/// Pass-through extractor for pre-extracted landmark frames.
///
/// Applies the detection confidence threshold the live landmarker would
/// apply: frames reporting a confidence below `min_confidence` count as
/// "no hand". Frames without a confidence score pass.
#[derive(Debug, Clone)]
pub struct ReplayExtractor {
    min_confidence: f32,
    rejected: u64,
}

impl ReplayExtractor {
    pub fn new() -> Self {
        Self {
            min_confidence: defaults::MIN_DETECTION_CONFIDENCE,
            rejected: 0,
        }
    }

    /// Sets the minimum detection confidence.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Number of frames discarded for low confidence so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl Default for ReplayExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseExtractor for ReplayExtractor {
    type Image = LandmarkFrame;

    fn extract(&mut self, frame: LandmarkFrame) -> Result<Option<LandmarkFrame>> {
        if frame.is_empty() {
            return Ok(None);
        }
        if let Some(confidence) = frame.confidence
            && confidence < self.min_confidence
        {
            self.rejected += 1;
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn name(&self) -> &'static str {
        "replay-extractor"
    }
}
