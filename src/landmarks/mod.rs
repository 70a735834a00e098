//! Hand landmark data model.
//!
//! A [`LandmarkFrame`] is what the pose extractor produces for one camera
//! frame: 21 hand joints in normalized image coordinates. The normalizer turns
//! it into a [`FeatureVector`] for the classifier.

pub mod extractor;
pub mod normalizer;
pub mod replay;

pub use extractor::{PoseExtractor, ReplayExtractor};
pub use normalizer::{FeatureVector, normalize};
pub use replay::{ControlCommand, LandmarkRecord, ReplayItem, ReplaySource, read_records};

/// Index of the wrist landmark, the reference origin for normalization.
pub const WRIST: usize = 0;

/// A single tracked hand joint.
///
/// `x` and `y` are normalized image coordinates in `[0, 1]`; `z` is depth
/// relative to the wrist and is not used for classification.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Landmarks of one detected hand.
///
/// The point count is not validated here; the normalizer rejects frames that
/// do not carry exactly [`crate::defaults::LANDMARK_COUNT`] points.
#[derive(Debug, Clone, Default)]
pub struct LandmarkFrame {
    pub points: Vec<Landmark>,
    /// Detection confidence reported by the extractor, when available.
    pub confidence: Option<f32>,
}

impl LandmarkFrame {
    /// Creates a frame without a confidence score.
    pub fn new(points: Vec<Landmark>) -> Self {
        Self {
            points,
            confidence: None,
        }
    }

    /// Attaches the extractor's detection confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
