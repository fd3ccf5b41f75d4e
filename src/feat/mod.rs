//! Node feature extraction.
//!
//! Every node evaluated by a learned strategy is summarized as a fixed-size
//! vector of reals, normalized against global search state (root bound,
//! best bound, incumbent bound) so that values are comparable across
//! problems. One buffer is allocated per strategy at run start and
//! overwritten on every extraction.
//!
//! The policy weight layout is depth- and direction-bucketed: node depth is
//! partitioned into 10 buckets and each bucket reserves two disjoint weight
//! windows, one per branching bound type. [`FeatureVector::offset`] maps a
//! node's context to the start of its window.

use crate::search::{BoundType, BranchDirection, Node, NodeKind, SearchState};

/// Feature indices for node selection.
#[derive(Debug, Clone, Copy)]
#[repr(usize)]
pub enum SelectFeature {
    /// Node lower bound relative to the root bound.
    LowerBound = 0,
    /// Node estimate relative to the root bound.
    Estimate = 1,
    /// Node is a sibling of the focus node.
    KindSibling = 2,
    /// Node is a child of the focus node.
    KindChild = 3,
    /// Node is an open leaf.
    KindLeaf = 4,
    /// Relative global optimality gap.
    Gap = 5,
    /// The gap is not finite.
    GapInf = 6,
    /// No finite incumbent bound exists.
    UpperBoundInf = 7,
    /// Position of the node bound within the global gap.
    RelativeBound = 8,
    /// Position of the node estimate within the global gap.
    RelativeEstimate = 9,
    /// Branching bound minus the variable's relaxation value.
    BranchBoundDiff = 10,
    /// Root relaxation value minus the current relaxation value.
    BranchRootDiff = 11,
    /// Branching variable prefers the up direction.
    BranchPrefUp = 12,
    /// Branching variable prefers the down direction.
    BranchPrefDown = 13,
    /// Pseudocost estimate scaled by the objective coefficient.
    BranchPseudocost = 14,
    /// Average inference count of the branching variable.
    BranchInferences = 15,
    /// Current plunge depth, normalized.
    PlungeDepth = 16,
    /// Node depth, normalized.
    RelativeDepth = 17,
}

/// Number of node selection features.
pub const SELECT_FEATURE_COUNT: usize = 18;

/// Feature indices for node pruning.
#[derive(Debug, Clone, Copy)]
#[repr(usize)]
pub enum PruneFeature {
    /// Relative global optimality gap.
    Gap = 0,
    /// The gap is not finite.
    GapInf = 1,
    /// Global lower bound relative to the root bound.
    GlobalLowerBound = 2,
    /// Global upper bound relative to the root bound.
    GlobalUpperBound = 3,
    /// No finite incumbent bound exists.
    GlobalUpperBoundInf = 4,
    /// Number of incumbents found so far.
    IncumbentCount = 5,
    /// Current plunge depth, normalized.
    PlungeDepth = 6,
    /// Node depth, normalized.
    RelativeDepth = 7,
    /// Node bound relative to the global gap.
    RelativeBound = 8,
    /// Node estimate relative to the global gap.
    RelativeEstimate = 9,
    /// Branching bound minus the variable's relaxation value.
    BranchBoundDiff = 10,
    /// Root relaxation value minus the current relaxation value.
    BranchRootDiff = 11,
    /// Branching variable prefers the up direction.
    BranchPrefUp = 12,
    /// Branching variable prefers the down direction.
    BranchPrefDown = 13,
    /// Pseudocost estimate scaled by the objective coefficient.
    BranchPseudocost = 14,
    /// Average inference count of the branching variable.
    BranchInferences = 15,
}

/// Number of node pruning features.
pub const PRUNE_FEATURE_COUNT: usize = 16;

/// Bounds within this distance of zero are floored before division.
const ZERO_EPS: f64 = 1e-9;

/// Substitute for a near-zero root bound normalizer.
const ROOT_BOUND_FLOOR: f64 = 1e-4;

/// A reusable fixed-size feature buffer with its node context.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    vals: Vec<f64>,
    max_depth: usize,
    depth: usize,
    bound_type: BoundType,
}

impl FeatureVector {
    /// Create a zeroed feature vector of the given size.
    ///
    /// `max_depth` is the depth normalizer for the whole run, typically the
    /// number of decision variables of the problem. Must be positive.
    pub fn new(size: usize, max_depth: usize) -> Self {
        assert!(max_depth > 0, "feature depth normalizer must be positive");
        Self {
            vals: vec![0.0; size],
            max_depth,
            depth: 0,
            bound_type: BoundType::Lower,
        }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.vals.len()
    }

    /// Whether the vector has zero length.
    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// The feature values.
    pub fn values(&self) -> &[f64] {
        &self.vals
    }

    /// Depth of the node currently represented.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bound type of the branching that created the represented node.
    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    /// The run-wide depth normalizer.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Start of this node's window in the flat policy weight vector.
    ///
    /// Depth is partitioned into 10 buckets; each bucket holds two
    /// consecutive windows of `len()` weights, one per bound type.
    pub fn offset(&self) -> usize {
        let bucket_width = (self.max_depth / 10).max(1);
        (self.vals.len() * 2) * (self.depth / bucket_width)
            + self.vals.len() * self.bound_type.ordinal()
    }

    /// Training instance weight of an example drawn from this node.
    ///
    /// Decays exponentially with depth so that decisions near the root,
    /// which commit the largest subtrees, dominate the training loss.
    pub fn example_weight(&self) -> f64 {
        let depth = self.depth as f64;
        let max_depth = self.max_depth as f64;
        5.0 * (-(depth - 1.0) / (0.6 * max_depth) * 1.61).exp()
    }

    /// Zero all values and install a new node context.
    fn reset(&mut self, depth: usize, bound_type: BoundType) {
        self.vals.iter_mut().for_each(|v| *v = 0.0);
        self.depth = depth;
        self.bound_type = bound_type;
    }

    fn set_select(&mut self, f: SelectFeature, v: f64) {
        self.vals[f as usize] = v;
    }

    fn set_prune(&mut self, f: PruneFeature, v: f64) {
        self.vals[f as usize] = v;
    }
}

/// Root bound normalizer: absolute value, floored away from zero.
fn root_bound_normalizer<S: SearchState>(state: &S) -> f64 {
    let root = state.root_lower_bound().abs();
    if root < ZERO_EPS {
        ROOT_BOUND_FLOOR
    } else {
        root
    }
}

/// Branching-variable feature block shared by both layouts.
///
/// `inferences` and the last five indices coincide in the two layouts, so
/// the block is written through raw indices valid for either.
fn calc_branch_features<S: SearchState>(
    state: &S,
    node: &Node,
    feat: &mut FeatureVector,
    bound_diff_idx: usize,
) {
    let branching = node
        .branchings
        .last()
        .expect("featurized node has no branching decision");

    let var = branching.var;
    let var_sol = state.relaxation_value(var);
    let var_root_sol = state.root_relaxation_value(var);
    let var_obj = state.objective_coefficient(var);

    feat.vals[bound_diff_idx] = branching.bound - var_sol;
    feat.vals[bound_diff_idx + 1] = var_root_sol - var_sol;

    match state.branch_preference(var) {
        Some(BranchDirection::Up) => feat.vals[bound_diff_idx + 2] = 1.0,
        Some(BranchDirection::Down) => feat.vals[bound_diff_idx + 3] = 1.0,
        None => {}
    }

    feat.vals[bound_diff_idx + 4] =
        state.pseudocost(var, branching.bound - var_sol) / var_obj.abs().max(ROOT_BOUND_FLOOR);

    // A lower-bound branching moved the variable up, so the inference
    // statistic of the opposite direction applies.
    let inf_dir = match branching.bound_type {
        BoundType::Lower => BranchDirection::Up,
        BoundType::Upper => BranchDirection::Down,
    };
    feat.vals[bound_diff_idx + 5] =
        state.avg_inferences(var, inf_dir) / feat.max_depth as f64;
}

/// Calculate node selection features.
///
/// Preconditions: the node is not the root and carries at least one
/// branching decision; the buffer was created with
/// [`SELECT_FEATURE_COUNT`] entries and a positive normalizer.
pub fn calc_select_features<S: SearchState>(state: &S, node: &Node, feat: &mut FeatureVector) {
    assert!(node.depth > 0, "the root node is never featurized");
    assert_eq!(feat.len(), SELECT_FEATURE_COUNT);

    let bound_type = node
        .branchings
        .last()
        .expect("featurized node has no branching decision")
        .bound_type;
    feat.reset(node.depth, bound_type);

    let root_bound = root_bound_normalizer(state);
    let lower = state.global_lower_bound();
    let mut upper = state.global_upper_bound();
    let upper_inf = upper.is_infinite();

    feat.set_select(SelectFeature::LowerBound, node.lower_bound / root_bound);
    feat.set_select(SelectFeature::Estimate, node.estimate / root_bound);

    match node.kind {
        NodeKind::Sibling => feat.set_select(SelectFeature::KindSibling, 1.0),
        NodeKind::Child => feat.set_select(SelectFeature::KindChild, 1.0),
        NodeKind::Leaf => feat.set_select(SelectFeature::KindLeaf, 1.0),
        NodeKind::Root => unreachable!("the root node is never featurized"),
    }

    if (upper - lower).abs() < ZERO_EPS {
        feat.set_select(SelectFeature::Gap, 0.0);
    } else if lower.abs() < ZERO_EPS || upper_inf {
        feat.set_select(SelectFeature::GapInf, 1.0);
    } else {
        feat.set_select(SelectFeature::Gap, (upper - lower) / lower.abs());
    }

    if upper_inf || state.incumbents_found() == 0 {
        feat.set_select(SelectFeature::UpperBoundInf, 1.0);
    }

    // Before the first incumbent the upper bound is usually meaningless;
    // use 20% of the gap as a surrogate.
    if state.incumbents_found() == 0 {
        upper = lower + 0.2 * (upper - lower);
    }
    if (upper - lower).abs() >= ZERO_EPS {
        feat.set_select(
            SelectFeature::RelativeBound,
            (node.lower_bound - lower) / (upper - lower),
        );
        feat.set_select(
            SelectFeature::RelativeEstimate,
            (node.estimate - lower) / (upper - lower),
        );
    }

    calc_branch_features(state, node, feat, SelectFeature::BranchBoundDiff as usize);

    feat.set_select(
        SelectFeature::PlungeDepth,
        state.plunge_depth() as f64 / feat.max_depth as f64,
    );
    feat.set_select(
        SelectFeature::RelativeDepth,
        node.depth as f64 / feat.max_depth as f64,
    );
}

/// Calculate node pruning features.
///
/// Same preconditions as [`calc_select_features`], with a buffer of
/// [`PRUNE_FEATURE_COUNT`] entries.
pub fn calc_prune_features<S: SearchState>(state: &S, node: &Node, feat: &mut FeatureVector) {
    assert!(node.depth > 0, "the root node is never featurized");
    assert_eq!(feat.len(), PRUNE_FEATURE_COUNT);

    let bound_type = node
        .branchings
        .last()
        .expect("featurized node has no branching decision")
        .bound_type;
    feat.reset(node.depth, bound_type);

    let root_bound = root_bound_normalizer(state);
    let lower = state.global_lower_bound();
    let mut upper = state.global_upper_bound();
    let upper_inf = upper.is_infinite();

    if (upper - lower).abs() < ZERO_EPS {
        feat.set_prune(PruneFeature::Gap, 0.0);
    } else if lower.abs() < ZERO_EPS || upper_inf {
        feat.set_prune(PruneFeature::GapInf, 1.0);
    } else {
        feat.set_prune(PruneFeature::Gap, (upper - lower) / lower.abs());
    }

    feat.set_prune(PruneFeature::GlobalLowerBound, lower / root_bound);
    if upper_inf {
        feat.set_prune(PruneFeature::GlobalUpperBoundInf, 1.0);
    } else {
        feat.set_prune(PruneFeature::GlobalUpperBound, upper / root_bound);
    }

    feat.set_prune(
        PruneFeature::IncumbentCount,
        state.incumbents_found() as f64,
    );
    feat.set_prune(
        PruneFeature::PlungeDepth,
        state.plunge_depth() as f64 / feat.max_depth as f64,
    );
    feat.set_prune(
        PruneFeature::RelativeDepth,
        node.depth as f64 / feat.max_depth as f64,
    );

    if upper_inf {
        upper = lower + 0.2 * (upper - lower);
    }
    if (upper - lower).abs() >= ZERO_EPS {
        feat.set_prune(PruneFeature::RelativeBound, node.lower_bound / (upper - lower));
        feat.set_prune(PruneFeature::RelativeEstimate, node.estimate / (upper - lower));
    }

    calc_branch_features(state, node, feat, PruneFeature::BranchBoundDiff as usize);
}
