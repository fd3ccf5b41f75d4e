//! Engine-facing accessor contract.

use super::node::BranchDirection;

/// Read-only view of the engine's global search state.
///
/// The strategies are passive collaborators of an external branch-and-bound
/// engine; everything they know about the search beyond the node itself
/// comes through this trait. All methods are cheap accessors and must not
/// mutate engine state.
pub trait SearchState {
    /// Number of decision variables in the problem.
    ///
    /// Used as the depth normalizer for node selection features.
    fn num_decision_vars(&self) -> usize;

    /// Number of discrete (binary + integer) decision variables.
    ///
    /// Used as the depth normalizer for node pruning features.
    fn num_discrete_vars(&self) -> usize;

    /// Resolve a variable name to its engine index.
    fn var_index(&self, name: &str) -> Option<usize>;

    /// Best proved lower bound across all open nodes.
    fn global_lower_bound(&self) -> f64;

    /// Incumbent objective value, or infinity if none found yet.
    fn global_upper_bound(&self) -> f64;

    /// Lower bound proved at the root relaxation.
    fn root_lower_bound(&self) -> f64;

    /// Number of incumbent solutions found so far.
    fn incumbents_found(&self) -> u64;

    /// Current plunge depth (consecutive child selections).
    fn plunge_depth(&self) -> usize;

    /// Current relaxation value of a variable.
    fn relaxation_value(&self, var: usize) -> f64;

    /// Root relaxation value of a variable.
    fn root_relaxation_value(&self, var: usize) -> f64;

    /// Objective coefficient of a variable.
    fn objective_coefficient(&self, var: usize) -> f64;

    /// Preferred branching direction of a variable, if any.
    fn branch_preference(&self, var: usize) -> Option<BranchDirection>;

    /// Pseudocost estimate of the objective change when moving a variable
    /// by `delta` from its relaxation value.
    fn pseudocost(&self, var: usize, delta: f64) -> f64;

    /// Average number of inferences derived from branching a variable in
    /// the given direction.
    fn avg_inferences(&self, var: usize, dir: BranchDirection) -> f64;
}
