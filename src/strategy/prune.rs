//! Node pruning strategies.
//!
//! Pruning is a yes/no call on every node the engine is about to expand:
//! discard it when the subtree cannot contain the solution the search is
//! after. The oracle answers from the reference solution, the policy from
//! a learned classifier, and dagger combines both to collect on-policy
//! classification examples.

use crate::error::{LearnError, LearnResult};
use crate::feat::{calc_prune_features, FeatureVector, PRUNE_FEATURE_COUNT};
use crate::oracle::{Oracle, ReferenceSolution};
use crate::policy::Policy;
use crate::search::{Node, SearchState};
use crate::settings::LearnSettings;
use crate::trajectory::TrajectoryRecorder;

/// Classification example label for a node that should be pruned.
const LABEL_PRUNE: i32 = 1;

/// Classification example label for a node that should be kept.
const LABEL_KEEP: i32 = -1;

/// Running counters of pruning decisions and their oracle verdicts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PruneStats {
    /// Nodes the strategy was asked about.
    pub nodes_checked: u64,

    /// Nodes the strategy discarded.
    pub nodes_pruned: u64,

    /// Optimal-path nodes that were discarded.
    pub false_positives: u64,

    /// Off-path nodes that were kept.
    pub false_negatives: u64,
}

/// Prunes every node the reference solution does not lie under.
///
/// With a trajectory file configured, every decision also yields one
/// classification example labeled by the verdict.
pub struct OraclePruner {
    oracle: Oracle,
    recorder: Option<TrajectoryRecorder>,
    feat: FeatureVector,
}

impl OraclePruner {
    /// Load the reference solution and open the optional trajectory file.
    pub fn new<S: SearchState>(state: &S, settings: &LearnSettings) -> LearnResult<Self> {
        let sol_path = settings.solution_file.as_deref().ok_or_else(|| {
            LearnError::Config("oracle node pruning requires a reference solution file".into())
        })?;
        let solution = ReferenceSolution::read(sol_path, state)?;
        let recorder = settings
            .trajectory_file
            .as_deref()
            .and_then(TrajectoryRecorder::open);

        Ok(Self {
            oracle: Oracle::new(solution),
            recorder,
            feat: FeatureVector::new(PRUNE_FEATURE_COUNT, state.num_discrete_vars()),
        })
    }

    /// Whether to discard the node. The root is never pruned.
    pub fn should_prune<S: SearchState>(&mut self, state: &S, node: &Node) -> bool {
        if node.depth == 0 {
            return false;
        }

        let optimal = self.oracle.is_optimal(node);

        if let Some(recorder) = self.recorder.as_mut() {
            calc_prune_features(state, node, &mut self.feat);
            let label = if optimal { LABEL_KEEP } else { LABEL_PRUNE };
            recorder.record_single(&self.feat, label);
        }

        !optimal
    }
}

/// Prunes by the learned classifier alone.
pub struct PolicyPruner {
    policy: Policy,
    feat: FeatureVector,
    nodes_checked: u64,
    nodes_pruned: u64,
}

impl PolicyPruner {
    /// Load the policy model.
    pub fn new<S: SearchState>(state: &S, settings: &LearnSettings) -> LearnResult<Self> {
        let pol_path = settings.policy_file.as_deref().ok_or_else(|| {
            LearnError::Config("policy node pruning requires a policy model file".into())
        })?;
        let policy = Policy::read(pol_path)?;

        Ok(Self {
            policy,
            feat: FeatureVector::new(PRUNE_FEATURE_COUNT, state.num_discrete_vars()),
            nodes_checked: 0,
            nodes_pruned: 0,
        })
    }

    /// Whether to discard the node. The root is never pruned.
    pub fn should_prune<S: SearchState>(&mut self, state: &S, node: &Node) -> bool {
        if node.depth == 0 {
            return false;
        }

        self.nodes_checked += 1;

        calc_prune_features(state, node, &mut self.feat);
        let score = self.policy.score(&self.feat);
        log::debug!("prune score of node #{}: {score}", node.id);

        let pruned = score > 0.0;
        if pruned {
            self.nodes_pruned += 1;
        }
        pruned
    }

    /// Nodes the pruner was asked about.
    pub fn nodes_checked(&self) -> u64 {
        self.nodes_checked
    }

    /// Nodes the pruner discarded.
    pub fn nodes_pruned(&self) -> u64 {
        self.nodes_pruned
    }

    /// Log how much of the tree was cut.
    pub fn log_statistics(&self) {
        log::info!(
            "node pruner: discarded {}/{} nodes",
            self.nodes_pruned,
            self.nodes_checked
        );
    }
}

/// Prunes by the policy while labeling every decision with the oracle.
///
/// The policy's verdict drives the search; the oracle's verdict labels the
/// recorded example and grades the policy, so a dagger run doubles as an
/// evaluation of the current model.
pub struct DaggerPruner {
    oracle: Oracle,
    policy: Policy,
    recorder: Option<TrajectoryRecorder>,
    feat: FeatureVector,
    stats: PruneStats,
}

impl DaggerPruner {
    /// Load the reference solution and policy, open the trajectory file.
    pub fn new<S: SearchState>(state: &S, settings: &LearnSettings) -> LearnResult<Self> {
        let sol_path = settings.solution_file.as_deref().ok_or_else(|| {
            LearnError::Config("dagger node pruning requires a reference solution file".into())
        })?;
        let pol_path = settings.policy_file.as_deref().ok_or_else(|| {
            LearnError::Config("dagger node pruning requires a policy model file".into())
        })?;
        let solution = ReferenceSolution::read(sol_path, state)?;
        let policy = Policy::read(pol_path)?;
        let recorder = settings
            .trajectory_file
            .as_deref()
            .and_then(TrajectoryRecorder::open);

        Ok(Self {
            oracle: Oracle::new(solution),
            policy,
            recorder,
            feat: FeatureVector::new(PRUNE_FEATURE_COUNT, state.num_discrete_vars()),
            stats: PruneStats::default(),
        })
    }

    /// Whether to discard the node, by the policy. The root is never
    /// pruned. The oracle grades the decision either way.
    pub fn should_prune<S: SearchState>(&mut self, state: &S, node: &Node) -> bool {
        if node.depth == 0 {
            return false;
        }

        self.stats.nodes_checked += 1;

        calc_prune_features(state, node, &mut self.feat);
        let score = self.policy.score(&self.feat);
        log::debug!("prune score of node #{}: {score}", node.id);

        let pruned = score > 0.0;
        let optimal = self.oracle.is_optimal(node);

        if pruned {
            self.stats.nodes_pruned += 1;
        }
        if optimal && pruned {
            self.stats.false_positives += 1;
        }
        if !optimal && !pruned {
            self.stats.false_negatives += 1;
        }

        if let Some(recorder) = self.recorder.as_mut() {
            let label = if optimal { LABEL_KEEP } else { LABEL_PRUNE };
            recorder.record_single(&self.feat, label);
        }

        pruned
    }

    /// The counters accumulated so far.
    pub fn stats(&self) -> PruneStats {
        self.stats
    }

    /// Log the policy's error rates against the oracle.
    pub fn log_statistics(&self) {
        log::info!(
            "node pruner: discarded {}/{} nodes, {} optimal nodes lost, {} off-path nodes kept",
            self.stats.nodes_pruned,
            self.stats.nodes_checked,
            self.stats.false_positives,
            self.stats.false_negatives
        );
    }
}
