//! Imitation-learned node selection and pruning for branch-and-bound search
//!
//! This library plugs learned decision strategies into an external
//! branch-and-bound engine. Two decision points are covered:
//!
//! - **Node selection**: which open node to expand next, learned as a
//!   pairwise ranking problem
//! - **Node pruning**: whether to discard a node before expanding it,
//!   learned as binary classification
//!
//! Both are trained by imitation of an *oracle* that knows an optimal
//! solution of the problem in advance: a node is labeled good exactly when
//! the known solution still lies in its subtree. Training data collection
//! follows the DAgger scheme, where the current policy drives the search
//! while the oracle labels every decision it faces, so the examples are
//! drawn from the states the policy actually visits.
//!
//! # Structure
//!
//! - [`search`]: the node snapshot and the [`search::SearchState`] accessor
//!   contract the engine must implement
//! - [`feat`]: fixed-size feature extraction with depth/direction-bucketed
//!   policy weight windows
//! - [`oracle`]: reference solutions and memoized optimal-path labeling
//! - [`policy`]: linear scoring models in libsvm weight format
//! - [`trajectory`]: training-example output in sparse libsvm format
//! - [`strategy`]: the oracle, policy, and dagger variants of both
//!   decision strategies
//!
//! # Example
//!
//! ```ignore
//! use solver_learn::{LearnSettings, strategy::DaggerSelector};
//!
//! let settings = LearnSettings::default()
//!     .with_solution_file("instance.sol")
//!     .with_policy_file("select.model")
//!     .with_trajectory_file("select.trj");
//!
//! // `state` implements solver_learn::SearchState for the engine.
//! let mut selector = DaggerSelector::new(&state, &settings)?;
//!
//! // At every selection event of the engine:
//! let next = selector.select_next(&state, &open_nodes);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod feat;
pub mod oracle;
pub mod policy;
pub mod search;
pub mod settings;
pub mod strategy;
pub mod trajectory;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::{LearnError, LearnResult};
pub use search::{Node, OpenNodes, SearchState};
pub use settings::LearnSettings;
