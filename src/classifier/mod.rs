//! Classifier boundary.
//!
//! The classifier maps a 42-value feature vector to one confidence score per
//! label. The production model is external; the session only relies on the
//! contract below.

pub mod centroid;

pub use centroid::CentroidClassifier;

use crate::defaults::FEATURE_LEN;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

/// Errors raised at the classifier boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Invalid input length: expected {expected}, got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },

    #[error("Classifier is closed")]
    Closed,

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Trait for feature-vector classification.
///
/// This trait allows swapping implementations (a real model vs mock).
/// Implementations are shared between the session and its worker thread, so
/// `close` takes `&self` and must make later `classify` calls fail with
/// [`ClassifierError::Closed`].
pub trait Classifier: Send + Sync {
    /// Scores every label for one feature vector.
    ///
    /// Fails with [`ClassifierError::InvalidInputLength`] unless `features`
    /// has exactly 42 values.
    fn classify(&self, features: &[f32]) -> Result<Vec<f32>, ClassifierError>;

    /// Number of scores `classify` returns.
    fn label_count(&self) -> usize;

    /// Whether the resource is loaded and not yet closed.
    fn is_ready(&self) -> bool;

    /// Releases the underlying resource.
    fn close(&self);

    /// Name of the loaded model, for logging.
    fn name(&self) -> &str;
}

/// Checks the input length shared by every implementation.
pub fn check_input_len(features: &[f32]) -> Result<(), ClassifierError> {
    if features.len() != FEATURE_LEN {
        return Err(ClassifierError::InvalidInputLength {
            expected: FEATURE_LEN,
            actual: features.len(),
        });
    }
    Ok(())
}

/// Result of one classification, reduced to the winning index.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    Valid { index: usize, scores: Vec<f32> },
    /// The classifier broke its contract (no scores, or a NaN score).
    Invalid,
}

impl ClassificationOutcome {
    /// Picks the arg-max of `scores`. The first maximum wins ties.
    pub fn from_scores(scores: Vec<f32>) -> Self {
        if scores.iter().any(|s| s.is_nan()) {
            return ClassificationOutcome::Invalid;
        }
        let mut best: Option<(usize, f32)> = None;
        for (i, &score) in scores.iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((i, score)),
            }
        }
        match best {
            Some((index, _)) => ClassificationOutcome::Valid { index, scores },
            None => ClassificationOutcome::Invalid,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            ClassificationOutcome::Valid { index, .. } => Some(*index),
            ClassificationOutcome::Invalid => None,
        }
    }
}

/// One-hot score vector, handy for scripting mock responses.
pub fn one_hot(index: usize, len: usize) -> Vec<f32> {
    let mut scores = vec![0.0; len];
    if let Some(slot) = scores.get_mut(index) {
        *slot = 1.0;
    }
    scores
}

/// Mock classifier for testing.
///
/// Returns scripted responses in order, then falls back to a default
/// response. Counts calls and closes so tests can check that the resource is
/// released exactly once.
#[derive(Debug)]
pub struct MockClassifier {
    label_count: usize,
    responses: Mutex<VecDeque<Result<Vec<f32>, ClassifierError>>>,
    fallback: Result<Vec<f32>, ClassifierError>,
    closed: AtomicBool,
    calls: AtomicUsize,
    closes: AtomicUsize,
}

impl MockClassifier {
    /// Creates a mock that always predicts label 0.
    pub fn new(label_count: usize) -> Self {
        Self {
            label_count,
            responses: Mutex::new(VecDeque::new()),
            fallback: Ok(one_hot(0, label_count)),
            closed: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    /// Queues predictions, one per call, as label indices.
    pub fn with_predictions(self, indices: &[usize]) -> Self {
        {
            let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
            for &i in indices {
                responses.push_back(Ok(one_hot(i, self.label_count)));
            }
        }
        self
    }

    /// Queues a raw response.
    pub fn with_response(self, response: Result<Vec<f32>, ClassifierError>) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
        self
    }

    /// Sets the response used once the queue is empty.
    pub fn with_fallback(mut self, response: Result<Vec<f32>, ClassifierError>) -> Self {
        self.fallback = response;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, features: &[f32]) -> Result<Vec<f32>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClassifierError::Closed);
        }
        check_input_len(features)?;
        let queued = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }

    fn label_count(&self) -> usize {
        self.label_count
    }

    fn is_ready(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "mock"
    }
}
