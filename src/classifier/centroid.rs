//! Nearest-centroid classifier.
//!
//! A small reference model so the pipeline can run end to end without an
//! external inference runtime. Each label is represented by the mean of its
//! training feature vectors; the score of a label is the negative squared
//! distance to its centroid, so the arg-max is the nearest centroid.

use crate::classifier::{Classifier, ClassifierError, check_input_len};
use crate::defaults::FEATURE_LEN;
use crate::error::{Result, SigntypeError};
use crate::labels::LabelTable;
use crate::landmarks::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// On-disk model format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CentroidModel {
    centroids: Vec<Vec<f32>>,
}

pub struct CentroidClassifier {
    centroids: Vec<Vec<f32>>,
    name: String,
    closed: AtomicBool,
}

impl CentroidClassifier {
    /// Builds a classifier from centroids in label order.
    pub fn from_centroids(centroids: Vec<Vec<f32>>) -> Result<Self> {
        if centroids.is_empty() {
            return Err(SigntypeError::ModelInvalid {
                message: "model has no centroids".to_string(),
            });
        }
        for (i, c) in centroids.iter().enumerate() {
            if c.len() != FEATURE_LEN {
                return Err(SigntypeError::ModelInvalid {
                    message: format!(
                        "centroid {} has {} values, expected {}",
                        i,
                        c.len(),
                        FEATURE_LEN
                    ),
                });
            }
            if c.iter().any(|v| !v.is_finite()) {
                return Err(SigntypeError::ModelInvalid {
                    message: format!("centroid {} contains a non-finite value", i),
                });
            }
        }
        Ok(Self {
            centroids,
            name: "centroid".to_string(),
            closed: AtomicBool::new(false),
        })
    }

    /// Loads a model file written by [`CentroidClassifier::save`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SigntypeError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        let text = fs::read_to_string(path)?;
        let model: CentroidModel = serde_json::from_str(&text)?;
        let mut classifier = Self::from_centroids(model.centroids)?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            classifier.name = stem.to_string();
        }
        Ok(classifier)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let model = CentroidModel {
            centroids: self.centroids.clone(),
        };
        fs::write(path, serde_json::to_string_pretty(&model)?)?;
        Ok(())
    }

    /// Trains one centroid per label from labeled feature vectors.
    ///
    /// Labels are sorted, so the returned label table and the classifier
    /// outputs agree on positions.
    pub fn train(samples: &[(String, FeatureVector)]) -> Result<(LabelTable, Self)> {
        let mut sums: BTreeMap<&str, (Vec<f32>, usize)> = BTreeMap::new();
        for (label, features) in samples {
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            let entry = sums
                .entry(label)
                .or_insert_with(|| (vec![0.0; FEATURE_LEN], 0));
            for (acc, v) in entry.0.iter_mut().zip(features.as_slice()) {
                *acc += v;
            }
            entry.1 += 1;
        }

        if sums.is_empty() {
            return Err(SigntypeError::ModelInvalid {
                message: "no labeled samples to train on".to_string(),
            });
        }

        let mut labels = Vec::with_capacity(sums.len());
        let mut centroids = Vec::with_capacity(sums.len());
        for (label, (sum, count)) in sums {
            labels.push(label.to_string());
            centroids.push(sum.into_iter().map(|v| v / count as f32).collect());
        }

        Ok((LabelTable::new(labels), Self::from_centroids(centroids)?))
    }
}

impl Classifier for CentroidClassifier {
    fn classify(&self, features: &[f32]) -> std::result::Result<Vec<f32>, ClassifierError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClassifierError::Closed);
        }
        check_input_len(features)?;
        Ok(self
            .centroids
            .iter()
            .map(|c| {
                -c.iter()
                    .zip(features)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>()
            })
            .collect())
    }

    fn label_count(&self) -> usize {
        self.centroids.len()
    }

    fn is_ready(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassificationOutcome;
    use crate::landmarks::{Landmark, LandmarkFrame, normalize};
    use tempfile::tempdir;

    /// Hand with landmark 8 pushed in one direction; different directions
    /// give clearly separated feature vectors.
    fn pointing(dx: f32, dy: f32) -> FeatureVector {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); 21];
        for (i, p) in points.iter_mut().enumerate().skip(1) {
            p.x += 0.01 * i as f32;
        }
        points[8] = Landmark::new(0.5 + dx, 0.5 + dy, 0.0);
        normalize(&LandmarkFrame::new(points)).unwrap()
    }

    #[test]
    fn test_train_sorts_labels_and_predicts_nearest() {
        let samples = vec![
            ("B".to_string(), pointing(0.0, -0.4)),
            ("A".to_string(), pointing(0.4, 0.0)),
            ("B".to_string(), pointing(0.02, -0.38)),
            ("A".to_string(), pointing(0.38, 0.02)),
        ];
        let (labels, classifier) = CentroidClassifier::train(&samples).unwrap();
        assert_eq!(labels.labels(), &["A".to_string(), "B".to_string()]);
        assert_eq!(classifier.label_count(), 2);

        let scores = classifier.classify(pointing(0.39, 0.01).as_slice()).unwrap();
        assert_eq!(ClassificationOutcome::from_scores(scores).index(), Some(0));

        let scores = classifier.classify(pointing(0.01, -0.39).as_slice()).unwrap();
        assert_eq!(ClassificationOutcome::from_scores(scores).index(), Some(1));
    }

    #[test]
    fn test_train_skips_blank_labels() {
        let samples = vec![
            ("  ".to_string(), pointing(0.4, 0.0)),
            ("C".to_string(), pointing(0.0, 0.4)),
        ];
        let (labels, _) = CentroidClassifier::train(&samples).unwrap();
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_train_without_samples_fails() {
        assert!(matches!(
            CentroidClassifier::train(&[]),
            Err(SigntypeError::ModelInvalid { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_centroid_length() {
        let result = CentroidClassifier::from_centroids(vec![vec![0.0; 40]]);
        assert!(matches!(result, Err(SigntypeError::ModelInvalid { .. })));
    }

    #[test]
    fn test_rejects_non_finite_centroid() {
        let mut centroid = vec![0.0; FEATURE_LEN];
        centroid[3] = f32::INFINITY;
        let result = CentroidClassifier::from_centroids(vec![centroid]);
        assert!(matches!(result, Err(SigntypeError::ModelInvalid { .. })));
    }

    #[test]
    fn test_classify_rejects_wrong_input_length() {
        let classifier = CentroidClassifier::from_centroids(vec![vec![0.0; FEATURE_LEN]]).unwrap();
        assert_eq!(
            classifier.classify(&[0.0; 21]),
            Err(ClassifierError::InvalidInputLength {
                expected: 42,
                actual: 21
            })
        );
    }

    #[test]
    fn test_close_makes_classify_fail() {
        let classifier = CentroidClassifier::from_centroids(vec![vec![0.0; FEATURE_LEN]]).unwrap();
        classifier.close();
        assert!(!classifier.is_ready());
        assert_eq!(classifier.classify(&[0.0; 42]), Err(ClassifierError::Closed));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("letters.json");
        let centroids = vec![vec![0.5; FEATURE_LEN], vec![-0.5; FEATURE_LEN]];
        let classifier = CentroidClassifier::from_centroids(centroids).unwrap();
        classifier.save(&path).unwrap();

        let loaded = CentroidClassifier::load(&path).unwrap();
        assert_eq!(loaded.label_count(), 2);
        assert_eq!(loaded.name(), "letters");
        let scores = loaded.classify(&[0.4; 42]).unwrap();
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_load_missing_model() {
        assert!(matches!(
            CentroidClassifier::load(Path::new("/nonexistent/centroids.json")),
            Err(SigntypeError::ModelNotFound { .. })
        ));
    }
}
