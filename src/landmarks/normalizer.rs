//! Landmark normalization: translation- and scale-invariant feature vectors.

use crate::defaults::{COORDS_PER_LANDMARK, FEATURE_LEN, LANDMARK_COUNT, NORMALIZE_EPSILON};
use crate::landmarks::{LandmarkFrame, WRIST};
use crate::session::SessionError;

/// Classifier input: `x0, y0, x1, y1, …` for the 21 hand landmarks, every
/// value in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_LEN]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Normalized `(x, y)` of landmark `index`.
    pub fn point(&self, index: usize) -> Option<(f32, f32)> {
        let base = index.checked_mul(COORDS_PER_LANDMARK)?;
        Some((*self.0.get(base)?, *self.0.get(base + 1)?))
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Normalizes a landmark frame into a feature vector.
///
/// The wrist becomes the origin and every coordinate is divided by the
/// largest absolute translated coordinate, so the result does not depend on
/// where the hand is in the image or how large it appears. Depth is dropped.
///
/// Fails with [`SessionError::InvalidLandmarkCount`] unless the frame has
/// exactly 21 points.
pub fn normalize(frame: &LandmarkFrame) -> Result<FeatureVector, SessionError> {
    if frame.points.len() != LANDMARK_COUNT {
        return Err(SessionError::InvalidLandmarkCount {
            expected: LANDMARK_COUNT,
            actual: frame.points.len(),
        });
    }

    let origin = frame.points[WRIST];
    let mut values = [0.0f32; FEATURE_LEN];
    for (slot, point) in values
        .chunks_exact_mut(COORDS_PER_LANDMARK)
        .zip(&frame.points)
    {
        slot[0] = point.x - origin.x;
        slot[1] = point.y - origin.y;
    }

    let max_abs = values
        .iter()
        .fold(0.0f32, |acc, v| acc.max(v.abs()))
        .max(NORMALIZE_EPSILON);

    for value in &mut values {
        *value /= max_abs;
    }

    Ok(FeatureVector(values))
}
