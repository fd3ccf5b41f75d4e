//! Node selection strategies.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{LearnError, LearnResult};
use crate::feat::{calc_select_features, FeatureVector, SELECT_FEATURE_COUNT};
use crate::oracle::{Oracle, ReferenceSolution};
use crate::policy::Policy;
use crate::search::{Node, OpenNodes, SearchState};
use crate::settings::LearnSettings;
use crate::trajectory::TrajectoryRecorder;

use super::{depth_bound_tiebreak, score_compare};

/// Emit pairwise ranking examples for one selection event.
///
/// The winner is the optimal child; every other child, sibling and leaf is
/// a loser. When no child is optimal, the freshly created children are
/// ranked below the most recent optimal node instead, whose features are
/// kept across events in `opt_feat`.
fn emit_pairwise_examples<S: SearchState>(
    state: &S,
    open: &OpenNodes,
    oracle: &mut Oracle,
    recorder: &mut TrajectoryRecorder,
    feat: &mut FeatureVector,
    opt_feat: &mut FeatureVector,
    opt_feat_valid: &mut bool,
) {
    let winner = open.children.iter().find(|c| oracle.is_optimal(c));

    if let Some(winner) = winner {
        calc_select_features(state, winner, opt_feat);
        *opt_feat_valid = true;

        let losers = open
            .children
            .iter()
            .filter(|c| c.id != winner.id)
            .chain(open.siblings.iter())
            .chain(open.leaves.iter());
        for loser in losers {
            calc_select_features(state, loser, feat);
            recorder.record_pair(opt_feat, feat, 1);
        }
    } else if *opt_feat_valid {
        for child in open.children.iter() {
            calc_select_features(state, child, feat);
            recorder.record_pair(opt_feat, feat, 1);
        }
    }
}

/// Selects the node the reference solution lies under.
///
/// Optimal nodes rank before all others; among equals, deeper nodes and
/// then lower bounds win. With a trajectory file configured, every
/// selection event also yields pairwise training examples.
pub struct OracleSelector {
    oracle: Oracle,
    recorder: Option<TrajectoryRecorder>,
    feat: FeatureVector,
    opt_feat: FeatureVector,
    opt_feat_valid: bool,
}

impl OracleSelector {
    /// Load the reference solution and open the optional trajectory file.
    pub fn new<S: SearchState>(state: &S, settings: &LearnSettings) -> LearnResult<Self> {
        let sol_path = settings.solution_file.as_deref().ok_or_else(|| {
            LearnError::Config("oracle node selection requires a reference solution file".into())
        })?;
        let solution = ReferenceSolution::read(sol_path, state)?;
        let recorder = settings
            .trajectory_file
            .as_deref()
            .and_then(TrajectoryRecorder::open);

        let max_depth = state.num_decision_vars();
        Ok(Self {
            oracle: Oracle::new(solution),
            recorder,
            feat: FeatureVector::new(SELECT_FEATURE_COUNT, max_depth),
            opt_feat: FeatureVector::new(SELECT_FEATURE_COUNT, max_depth),
            opt_feat_valid: false,
        })
    }

    /// Label all open nodes, record examples, and pick the next node.
    pub fn select_next<S: SearchState>(&mut self, state: &S, open: &OpenNodes) -> Option<u64> {
        for node in open.iter() {
            self.oracle.is_optimal(node);
        }

        if let Some(recorder) = self.recorder.as_mut() {
            emit_pairwise_examples(
                state,
                open,
                &mut self.oracle,
                recorder,
                &mut self.feat,
                &mut self.opt_feat,
                &mut self.opt_feat_valid,
            );
        }

        let mut best: Option<&Node> = None;
        for node in open.iter() {
            best = Some(match best {
                None => node,
                Some(current) => {
                    if self.compare(node, current) == Ordering::Less {
                        node
                    } else {
                        current
                    }
                }
            });
        }
        best.map(|n| n.id)
    }

    /// Rank two labeled nodes.
    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        let opt_a = self.oracle.label(a.id).unwrap_or(false);
        let opt_b = self.oracle.label(b.id).unwrap_or(false);
        match (opt_a, opt_b) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => depth_bound_tiebreak(a, b),
        }
    }
}

/// Selects nodes by the learned policy score alone.
///
/// Pure inference: no oracle, no training output.
pub struct PolicySelector {
    policy: Policy,
    feat: FeatureVector,
    scores: HashMap<u64, f64>,
}

impl PolicySelector {
    /// Load the policy model.
    pub fn new<S: SearchState>(state: &S, settings: &LearnSettings) -> LearnResult<Self> {
        let pol_path = settings.policy_file.as_deref().ok_or_else(|| {
            LearnError::Config("policy node selection requires a policy model file".into())
        })?;
        let policy = Policy::read(pol_path)?;

        Ok(Self {
            policy,
            feat: FeatureVector::new(SELECT_FEATURE_COUNT, state.num_decision_vars()),
            scores: HashMap::new(),
        })
    }

    /// Score the newly created children and pick the best open node.
    pub fn select_next<S: SearchState>(&mut self, state: &S, open: &OpenNodes) -> Option<u64> {
        for child in open.children.iter() {
            calc_select_features(state, child, &mut self.feat);
            let score = self.policy.score(&self.feat);
            self.scores.insert(child.id, score);
            log::debug!("score of node #{}: {score}", child.id);
        }

        open.iter()
            .min_by(|a, b| score_compare(&self.scores, a, b))
            .map(|n| n.id)
    }
}

/// Acts by the policy, labels by the oracle.
///
/// The search follows the learned scores, so the emitted examples are
/// drawn from the states the current policy actually visits. Ranking
/// disagreements between policy and oracle are counted for reporting.
pub struct DaggerSelector {
    oracle: Oracle,
    policy: Policy,
    recorder: Option<TrajectoryRecorder>,
    feat: FeatureVector,
    opt_feat: FeatureVector,
    opt_feat_valid: bool,
    scores: HashMap<u64, f64>,
    ranking_errors: u64,
    comparisons: u64,
}

impl DaggerSelector {
    /// Load the reference solution and policy, open the trajectory file.
    pub fn new<S: SearchState>(state: &S, settings: &LearnSettings) -> LearnResult<Self> {
        let sol_path = settings.solution_file.as_deref().ok_or_else(|| {
            LearnError::Config("dagger node selection requires a reference solution file".into())
        })?;
        let pol_path = settings.policy_file.as_deref().ok_or_else(|| {
            LearnError::Config("dagger node selection requires a policy model file".into())
        })?;
        let solution = ReferenceSolution::read(sol_path, state)?;
        let policy = Policy::read(pol_path)?;
        let recorder = settings
            .trajectory_file
            .as_deref()
            .and_then(TrajectoryRecorder::open);

        let max_depth = state.num_decision_vars();
        Ok(Self {
            oracle: Oracle::new(solution),
            policy,
            recorder,
            feat: FeatureVector::new(SELECT_FEATURE_COUNT, max_depth),
            opt_feat: FeatureVector::new(SELECT_FEATURE_COUNT, max_depth),
            opt_feat_valid: false,
            scores: HashMap::new(),
            ranking_errors: 0,
            comparisons: 0,
        })
    }

    /// Score and label the children, record examples, and pick the best
    /// open node under the policy ranking.
    pub fn select_next<S: SearchState>(&mut self, state: &S, open: &OpenNodes) -> Option<u64> {
        for child in open.children.iter() {
            calc_select_features(state, child, &mut self.feat);
            let score = self.policy.score(&self.feat);
            self.scores.insert(child.id, score);
            log::debug!("score of node #{}: {score}", child.id);

            self.oracle.is_optimal(child);
        }

        if let Some(recorder) = self.recorder.as_mut() {
            emit_pairwise_examples(
                state,
                open,
                &mut self.oracle,
                recorder,
                &mut self.feat,
                &mut self.opt_feat,
                &mut self.opt_feat_valid,
            );
        }

        let mut best: Option<&Node> = None;
        for node in open.iter() {
            best = Some(match best {
                None => node,
                Some(current) => {
                    if self.compare_counted(node, current) == Ordering::Less {
                        node
                    } else {
                        current
                    }
                }
            });
        }
        best.map(|n| n.id)
    }

    /// Number of comparisons where the policy ranked an oracle-optimal
    /// node below another node.
    pub fn ranking_errors(&self) -> u64 {
        self.ranking_errors
    }

    /// Total number of node comparisons performed.
    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    /// Log the policy-versus-oracle disagreement rate.
    pub fn log_statistics(&self) {
        log::info!(
            "node selector: {}/{} comparisons ranked an optimal node too low",
            self.ranking_errors,
            self.comparisons
        );
    }

    /// Policy ranking, with the oracle label used to count mistakes.
    fn compare_counted(&mut self, a: &Node, b: &Node) -> Ordering {
        let result = score_compare(&self.scores, a, b);

        let opt_a = self.oracle.label(a.id).unwrap_or(false);
        let opt_b = self.oracle.label(b.id).unwrap_or(false);
        if (opt_a && result == Ordering::Greater) || (opt_b && result == Ordering::Less) {
            self.ranking_errors += 1;
        }
        self.comparisons += 1;

        result
    }
}
