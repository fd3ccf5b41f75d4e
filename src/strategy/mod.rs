//! Decision strategies wiring features, oracle, policy and recorder into
//! the two callbacks the engine drives: "pick the next open node" and
//! "should this node be discarded".
//!
//! Three modes exist per decision point. Oracle strategies follow the
//! reference solution and can emit labeled training data; policy strategies
//! run pure inference on a trained model; dagger strategies act by the
//! policy while labeling every visited decision point with the oracle,
//! which is what makes the recorded data on-policy.
//!
//! A strategy's lifetime is one run: construction loads its files and
//! allocates its feature buffer, drop closes everything.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::search::Node;

pub mod prune;
pub mod select;

pub use prune::{DaggerPruner, OraclePruner, PolicyPruner, PruneStats};
pub use select::{DaggerSelector, OracleSelector, PolicySelector};

/// Shared selection tie-break: deeper nodes first, then lower bounds first.
fn depth_bound_tiebreak(a: &Node, b: &Node) -> Ordering {
    b.depth.cmp(&a.depth).then_with(|| {
        a.lower_bound
            .partial_cmp(&b.lower_bound)
            .unwrap_or(Ordering::Equal)
    })
}

/// Rank two scored nodes: higher score first, then the shared tie-break.
///
/// Panics when a node reaches a comparison without having been scored;
/// that indicates a broken call order, not a runtime condition.
fn score_compare(scores: &HashMap<u64, f64>, a: &Node, b: &Node) -> Ordering {
    let score_a = scores
        .get(&a.id)
        .copied()
        .expect("node compared before being scored");
    let score_b = scores
        .get(&b.id)
        .copied()
        .expect("node compared before being scored");

    score_b
        .partial_cmp(&score_a)
        .unwrap_or(Ordering::Equal)
        .then_with(|| depth_bound_tiebreak(a, b))
}
