//! Linear scoring policy.
//!
//! A policy is one flat weight vector holding a disjoint window per depth
//! bucket and branching direction (see [`FeatureVector::offset`]). A single
//! linear model thereby scores shallow and deep nodes, and up and down
//! branches, with independent weights.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LearnError, LearnResult};
use crate::feat::FeatureVector;

/// Number of header lines preceding the weights in a libsvm model file.
const MODEL_HEADER_LINES: usize = 6;

/// An immutable trained weight table.
#[derive(Debug, Clone)]
pub struct Policy {
    weights: Vec<f64>,
}

impl Policy {
    /// Build a policy directly from weights, for embedding and tests.
    pub fn from_weights(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// Read a policy from a libsvm model file.
    ///
    /// The fixed-size header is skipped; every following line holds one
    /// weight. A file shorter than the header or with an empty weight body
    /// is a fatal format error.
    pub fn read(path: &Path) -> LearnResult<Self> {
        let file = File::open(path).map_err(|source| LearnError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut weights = Vec::new();
        let mut nlines = 0usize;
        for line in reader.lines() {
            let line = line.map_err(|source| LearnError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            nlines += 1;
            if nlines <= MODEL_HEADER_LINES {
                continue;
            }
            let weight = line.trim().parse::<f64>().map_err(|_| {
                LearnError::PolicyFormat {
                    path: path.to_path_buf(),
                    reason: format!("unparsable weight <{}> on line {}", line.trim(), nlines),
                }
            })?;
            weights.push(weight);
        }

        if nlines < MODEL_HEADER_LINES {
            return Err(LearnError::PolicyFormat {
                path: path.to_path_buf(),
                reason: format!(
                    "expected a {MODEL_HEADER_LINES}-line header, found {nlines} lines"
                ),
            });
        }
        if weights.is_empty() {
            return Err(LearnError::PolicyFormat {
                path: path.to_path_buf(),
                reason: "empty policy model".into(),
            });
        }

        log::info!(
            "policy of size {} read from <{}>",
            weights.len(),
            path.display()
        );

        Ok(Self { weights })
    }

    /// Number of weights.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the policy has no weights.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Score a feature vector through its depth/direction weight window.
    ///
    /// Panics if the model is too small for the vector's offset; that is a
    /// setup mistake (model trained with a different layout), not a runtime
    /// condition.
    pub fn score(&self, feat: &FeatureVector) -> f64 {
        let offset = feat.offset();
        assert!(
            offset + feat.len() <= self.weights.len(),
            "policy model of size {} cannot score offset {} + {} features",
            self.weights.len(),
            offset,
            feat.len()
        );

        feat.values()
            .iter()
            .zip(&self.weights[offset..offset + feat.len()])
            .map(|(v, w)| v * w)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feat::{calc_select_features, SELECT_FEATURE_COUNT};
    use crate::test_util::{child_node, StubState};
    use crate::search::BoundType;
    use std::io::Write;

    fn write_model(path: &Path, weights: &[f64]) {
        let mut file = File::create(path).unwrap();
        for i in 0..MODEL_HEADER_LINES {
            writeln!(file, "header line {i}").unwrap();
        }
        for w in weights {
            writeln!(file, "{w}").unwrap();
        }
    }

    #[test]
    fn test_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");
        let weights: Vec<f64> = (0..40).map(|i| i as f64 * 0.5).collect();
        write_model(&path, &weights);

        let policy = Policy::read(&path).unwrap();
        assert_eq!(policy.len(), 40);
    }

    #[test]
    fn test_read_short_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "only").unwrap();
        writeln!(file, "three").unwrap();
        writeln!(file, "lines").unwrap();
        drop(file);

        assert!(matches!(
            Policy::read(&path),
            Err(LearnError::PolicyFormat { .. })
        ));
    }

    #[test]
    fn test_read_empty_body_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");
        write_model(&path, &[]);

        assert!(matches!(
            Policy::read(&path),
            Err(LearnError::PolicyFormat { .. })
        ));
    }

    #[test]
    fn test_score_is_linear() {
        // maxdepth 10, depth 1, lower bound: offset 2 * 18.
        let mut weights = vec![0.0; 4 * SELECT_FEATURE_COUNT];
        let offset = 2 * SELECT_FEATURE_COUNT;
        for (i, w) in weights[offset..offset + SELECT_FEATURE_COUNT]
            .iter_mut()
            .enumerate()
        {
            *w = (i + 1) as f64;
        }
        let policy = Policy::from_weights(weights);

        let mut state = StubState::new(10);
        state.global_lower_bound = 4.0;
        state.global_upper_bound = 6.0;
        state.root_lower_bound = 2.0;
        state.incumbents = 1;

        let node = child_node(1, 1, 5.0, 5.5, BoundType::Lower, 3.0);
        let mut feat = FeatureVector::new(SELECT_FEATURE_COUNT, 10);
        calc_select_features(&state, &node, &mut feat);
        let base = policy.score(&feat);

        // Doubling the node bound doubles that component's contribution.
        let scaled = child_node(1, 1, 10.0, 5.5, BoundType::Lower, 3.0);
        let mut feat2 = FeatureVector::new(SELECT_FEATURE_COUNT, 10);
        calc_select_features(&state, &scaled, &mut feat2);

        let expected_delta = (feat2.values()[0] - feat.values()[0]) * 1.0
            + (feat2.values()[8] - feat.values()[8]) * 9.0;
        assert!((policy.score(&feat2) - base - expected_delta).abs() < 1e-9);
    }

    #[test]
    fn test_score_of_zero_vector_is_zero() {
        let policy = Policy::from_weights(vec![1.0; 4 * SELECT_FEATURE_COUNT]);
        let feat = FeatureVector::new(SELECT_FEATURE_COUNT, 100);
        assert_eq!(policy.score(&feat), 0.0);
    }

    #[test]
    #[should_panic(expected = "policy model of size")]
    fn test_undersized_model_panics() {
        let policy = Policy::from_weights(vec![1.0; 8]);
        let mut state = StubState::new(10);
        state.global_lower_bound = 1.0;
        state.global_upper_bound = 2.0;
        state.root_lower_bound = 1.0;
        state.incumbents = 1;

        let node = child_node(1, 5, 1.0, 1.0, BoundType::Lower, 1.0);
        let mut feat = FeatureVector::new(SELECT_FEATURE_COUNT, 10);
        calc_select_features(&state, &node, &mut feat);
        policy.score(&feat);
    }
}
