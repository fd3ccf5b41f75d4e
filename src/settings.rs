//! Configuration for the learned decision strategies.

use std::path::PathBuf;

/// Per-run settings shared by all strategy modes.
///
/// Which fields are required depends on the mode: oracle strategies need a
/// reference solution, policy strategies need a trained model, and dagger
/// strategies need both. The trajectory file is always optional; when it is
/// absent (or cannot be opened) the run simply records no training data.
#[derive(Debug, Clone, Default)]
pub struct LearnSettings {
    /// Reference (optimal) solution file, read by the oracle.
    pub solution_file: Option<PathBuf>,

    /// Trained policy model file in libsvm weight format.
    pub policy_file: Option<PathBuf>,

    /// Trajectory output file for training examples.
    ///
    /// Examples are appended so that training data from multiple problems
    /// can accumulate in one file. A parallel `<file>.weight` stream holds
    /// one instance weight per example.
    pub trajectory_file: Option<PathBuf>,
}

impl LearnSettings {
    /// Set the reference solution file.
    pub fn with_solution_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.solution_file = Some(path.into());
        self
    }

    /// Set the policy model file.
    pub fn with_policy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_file = Some(path.into());
        self
    }

    /// Set the trajectory output file.
    pub fn with_trajectory_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.trajectory_file = Some(path.into());
        self
    }
}
