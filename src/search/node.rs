//! Search node snapshot.

/// Which bound a branching decision tightened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundType {
    /// Lower bound was raised (up branch).
    Lower,

    /// Upper bound was lowered (down branch).
    Upper,
}

impl BoundType {
    /// Ordinal used by the policy weight-window offset.
    pub fn ordinal(self) -> usize {
        match self {
            BoundType::Lower => 0,
            BoundType::Upper => 1,
        }
    }
}

/// Branching direction, for pseudocost and inference statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchDirection {
    /// Downward branch (tightened upper bound).
    Down,

    /// Upward branch (tightened lower bound).
    Up,
}

/// Position of an open node relative to the current focus node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The root of the tree.
    Root,

    /// Child of the focus node.
    Child,

    /// Sibling of the focus node.
    Sibling,

    /// Any other open leaf of the tree.
    Leaf,
}

/// One ancestor branching decision.
#[derive(Debug, Clone, Copy)]
pub struct BranchingDecision {
    /// Engine index of the branching variable.
    pub var: usize,

    /// Which bound the branching tightened.
    pub bound_type: BoundType,

    /// The new bound value.
    pub bound: f64,
}

/// A search node as handed over by the engine.
///
/// The engine owns the tree; this is a value snapshot of everything the
/// strategies need. The branching chain is carried by value so the core
/// never chases pointers through engine-owned ancestors.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique node identifier.
    pub id: u64,

    /// Parent node identifier (None for the root).
    pub parent_id: Option<u64>,

    /// Depth in the tree (0 for the root).
    pub depth: usize,

    /// Position relative to the focus node.
    pub kind: NodeKind,

    /// Lower bound proved at this node.
    pub lower_bound: f64,

    /// Estimate of the best solution reachable in this subtree.
    pub estimate: f64,

    /// Branching decisions on the path from the root, in root-to-node
    /// order. The last entry is the decision that created this node.
    pub branchings: Vec<BranchingDecision>,
}

impl Node {
    /// The branching decision that created this node.
    ///
    /// None only for the root, which is never featurized.
    pub fn branching(&self) -> Option<&BranchingDecision> {
        self.branchings.last()
    }
}

/// The engine's open-node snapshot at a selection event.
#[derive(Debug, Clone, Copy)]
pub struct OpenNodes<'a> {
    /// Children of the focus node.
    pub children: &'a [Node],

    /// Siblings of the focus node.
    pub siblings: &'a [Node],

    /// Remaining open leaves.
    pub leaves: &'a [Node],
}

impl<'a> OpenNodes<'a> {
    /// Iterate over all open nodes: children, then siblings, then leaves.
    pub fn iter(&self) -> impl Iterator<Item = &'a Node> {
        self.children
            .iter()
            .chain(self.siblings.iter())
            .chain(self.leaves.iter())
    }

    /// Whether there are no open nodes.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.siblings.is_empty() && self.leaves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branching_chain() {
        let node = Node {
            id: 3,
            parent_id: Some(1),
            depth: 2,
            kind: NodeKind::Child,
            lower_bound: 1.5,
            estimate: 2.0,
            branchings: vec![
                BranchingDecision { var: 0, bound_type: BoundType::Lower, bound: 1.0 },
                BranchingDecision { var: 4, bound_type: BoundType::Upper, bound: 0.0 },
            ],
        };

        // The newest decision is the one that created the node.
        let own = node.branching().unwrap();
        assert_eq!(own.var, 4);
        assert_eq!(own.bound_type, BoundType::Upper);
    }

    #[test]
    fn test_open_nodes_iteration_order() {
        let mk = |id: u64, kind: NodeKind| Node {
            id,
            parent_id: Some(0),
            depth: 1,
            kind,
            lower_bound: 0.0,
            estimate: 0.0,
            branchings: vec![BranchingDecision {
                var: 0,
                bound_type: BoundType::Lower,
                bound: 1.0,
            }],
        };

        let children = vec![mk(1, NodeKind::Child)];
        let siblings = vec![mk(2, NodeKind::Sibling)];
        let leaves = vec![mk(3, NodeKind::Leaf), mk(4, NodeKind::Leaf)];
        let open = OpenNodes {
            children: &children,
            siblings: &siblings,
            leaves: &leaves,
        };

        let ids: Vec<u64> = open.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(!open.is_empty());
    }
}
