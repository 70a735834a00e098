//! Default configuration constants for signtype.
//!
//! Shared by the configuration types, the pipeline and the CLI so the same
//! numbers are not repeated in several places.

/// Number of landmarks in a hand frame (wrist plus four joints per finger).
pub const LANDMARK_COUNT: usize = 21;

/// Coordinates kept per landmark after normalization (x and y; z is dropped).
pub const COORDS_PER_LANDMARK: usize = 2;

/// Length of the feature vector fed to the classifier.
pub const FEATURE_LEN: usize = LANDMARK_COUNT * COORDS_PER_LANDMARK;

/// Lower bound for the normalization divisor.
///
/// Keeps a degenerate frame (every point on top of the wrist) from dividing
/// by zero.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Default frame gate timeout in milliseconds.
///
/// A frame that has been in flight for longer than this is considered lost
/// (the extractor or classifier never answered) and its slot is reclaimed by
/// the next submission. Two seconds is far above a normal per-frame latency
/// of a few tens of milliseconds.
pub const GATE_TIMEOUT_MS: u64 = 2000;

/// Default minimum hand detection confidence.
///
/// Matches the detection threshold the hand landmarker was tuned with on the
/// device; frames detected with lower confidence are treated as "no hand".
pub const MIN_DETECTION_CONFIDENCE: f32 = 0.9;

/// Default camera frame rate used when replaying recorded landmarks.
pub const REPLAY_FPS: u32 = 30;

/// Default label table file name.
pub const LABELS_FILE: &str = "labels.txt";

/// Default classifier model file name.
pub const MODEL_FILE: &str = "centroids.json";

/// Channel capacity between pipeline stations.
///
/// The gate admits one frame at a time, so a single slot per hop suffices;
/// a small margin keeps control messages from blocking behind a frame.
pub const STATION_BUFFER: usize = 4;
