//! Search-side data model: nodes as handed over by the engine, and the
//! accessor contract the engine must provide.

pub mod node;
pub mod state;

pub use node::{BoundType, BranchDirection, BranchingDecision, Node, NodeKind, OpenNodes};
pub use state::SearchState;
