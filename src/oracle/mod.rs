//! Optimality oracle: labels nodes that lie on the path to a known
//! reference solution.
//!
//! A node is on the optimal path iff none of the branching decisions on its
//! root path cuts the reference solution off. Labels are memoized per node
//! so repeated queries (comparator callbacks visit nodes many times) cost a
//! single hash lookup.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LearnError, LearnResult};
use crate::search::{BoundType, Node, SearchState};

/// Header lines that may precede the data of a solution file.
const SKIP_PREFIXES: &[&str] = &[
    "solution status:",
    "objective value:",
    "log started",
    "variable name",
    "all other variables",
    "name",
    "endata",
];

/// An immutable reference solution, indexed by engine variable index.
///
/// Variables not mentioned in the solution file keep their default of 0.
#[derive(Debug, Clone)]
pub struct ReferenceSolution {
    values: Vec<f64>,
}

impl ReferenceSolution {
    /// Build a solution directly from values, for embedding and tests.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Read a solution file.
    ///
    /// Each data line is `<name> <value> [<objective>]`; `inv` skips the
    /// variable, `inf`/`+inf`/`-inf` (case-insensitive) map to the
    /// infinities. Known status and MPS marker lines are skipped. Unknown
    /// variable names are warned about once and then ignored; a malformed
    /// line aborts the read.
    pub fn read<S: SearchState>(path: &Path, state: &S) -> LearnResult<Self> {
        let file = File::open(path).map_err(|source| LearnError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut values = vec![0.0; state.num_decision_vars()];
        let mut warned_unknown = false;
        let mut nread = 0usize;

        for (lineno, line) in reader.lines().enumerate() {
            let lineno = lineno + 1;
            let line = line.map_err(|source| LearnError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            let lowered = line.to_ascii_lowercase();
            if line.trim().is_empty()
                || SKIP_PREFIXES.iter().any(|p| lowered.starts_with(p))
            {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let (name, value_token) = match (tokens.next(), tokens.next()) {
                (Some(n), Some(v)) => (n, v),
                _ => {
                    return Err(LearnError::SolutionFormat {
                        path: path.to_path_buf(),
                        line: lineno,
                        reason: format!("expected <name> <value>, got <{}>", line.trim()),
                    });
                }
            };

            let value = {
                let lowered = value_token.to_ascii_lowercase();
                if lowered.starts_with("inv") {
                    continue;
                } else if lowered.starts_with("+inf") || lowered.starts_with("inf") {
                    f64::INFINITY
                } else if lowered.starts_with("-inf") {
                    f64::NEG_INFINITY
                } else {
                    value_token.parse::<f64>().map_err(|_| {
                        LearnError::SolutionFormat {
                            path: path.to_path_buf(),
                            line: lineno,
                            reason: format!(
                                "invalid value <{value_token}> for variable <{name}>"
                            ),
                        }
                    })?
                }
            };

            match state.var_index(name) {
                Some(var) => {
                    values[var] = value;
                    nread += 1;
                }
                None => {
                    if !warned_unknown {
                        log::warn!(
                            "unknown variable <{}> in line {} of solution file <{}> \
                             (further unknown variables are ignored)",
                            name,
                            lineno,
                            path.display()
                        );
                        warned_unknown = true;
                    }
                }
            }
        }

        log::info!(
            "reference solution with {} assignments read from <{}>",
            nread,
            path.display()
        );

        Ok(Self { values })
    }

    /// Value of a variable in the reference solution.
    pub fn value(&self, var: usize) -> f64 {
        self.values[var]
    }
}

/// Memoized optimal-path labeling against a reference solution.
#[derive(Debug)]
pub struct Oracle {
    solution: ReferenceSolution,

    /// Per-node label cache; presence means the node was checked.
    memo: HashMap<u64, bool>,

    /// Number of full branching-chain walks, for tests.
    chain_walks: u64,
}

impl Oracle {
    /// Create an oracle over a reference solution.
    pub fn new(solution: ReferenceSolution) -> Self {
        Self {
            solution,
            memo: HashMap::new(),
            chain_walks: 0,
        }
    }

    /// Whether a node lies on the optimal path.
    ///
    /// The root is always optimal. A node whose parent is already known to
    /// be off the path is off the path too, without walking its chain;
    /// since the branching chain always covers the full root path, the
    /// short-circuit never changes the label, only the cost.
    pub fn is_optimal(&mut self, node: &Node) -> bool {
        if let Some(&label) = self.memo.get(&node.id) {
            return label;
        }

        if node.depth == 0 {
            self.memo.insert(node.id, true);
            return true;
        }

        if let Some(parent) = node.parent_id {
            if self.memo.get(&parent) == Some(&false) {
                self.memo.insert(node.id, false);
                return false;
            }
        }

        self.chain_walks += 1;
        let optimal = !node.branchings.iter().any(|decision| {
            let value = self.solution.value(decision.var);
            match decision.bound_type {
                BoundType::Lower => value < decision.bound,
                BoundType::Upper => value > decision.bound,
            }
        });

        self.memo.insert(node.id, optimal);
        optimal
    }

    /// Whether a node has been labeled already.
    pub fn checked(&self, id: u64) -> bool {
        self.memo.contains_key(&id)
    }

    /// The cached label of a node, if it was checked.
    pub fn label(&self, id: u64) -> Option<bool> {
        self.memo.get(&id).copied()
    }

    /// Number of branching-chain traversals performed so far.
    pub fn chain_walks(&self) -> u64 {
        self.chain_walks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{BranchingDecision, NodeKind};
    use crate::test_util::{root_node, StubState};
    use std::io::Write;

    fn node_with_chain(id: u64, parent: Option<u64>, chain: Vec<BranchingDecision>) -> Node {
        Node {
            id,
            parent_id: parent,
            depth: chain.len(),
            kind: NodeKind::Child,
            lower_bound: 0.0,
            estimate: 0.0,
            branchings: chain,
        }
    }

    fn decision(var: usize, bound_type: BoundType, bound: f64) -> BranchingDecision {
        BranchingDecision { var, bound_type, bound }
    }

    #[test]
    fn test_root_is_optimal() {
        let mut oracle = Oracle::new(ReferenceSolution::from_values(vec![0.0; 4]));
        assert!(oracle.is_optimal(&root_node()));
        assert_eq!(oracle.chain_walks(), 0);
    }

    #[test]
    fn test_bound_violations() {
        // Reference: x0 = 2, x1 = 5.
        let sol = ReferenceSolution::from_values(vec![2.0, 5.0]);
        let mut oracle = Oracle::new(sol);

        // x0 >= 1 holds, x1 <= 6 holds.
        let on_path = node_with_chain(
            1,
            Some(0),
            vec![
                decision(0, BoundType::Lower, 1.0),
                decision(1, BoundType::Upper, 6.0),
            ],
        );
        assert!(oracle.is_optimal(&on_path));

        // x0 >= 3 cuts the reference off.
        let off_lower = node_with_chain(2, Some(0), vec![decision(0, BoundType::Lower, 3.0)]);
        assert!(!oracle.is_optimal(&off_lower));

        // x1 <= 4 cuts the reference off.
        let off_upper = node_with_chain(3, Some(0), vec![decision(1, BoundType::Upper, 4.0)]);
        assert!(!oracle.is_optimal(&off_upper));

        // Bound met with equality is not a violation.
        let tight = node_with_chain(4, Some(0), vec![decision(0, BoundType::Lower, 2.0)]);
        assert!(oracle.is_optimal(&tight));
    }

    #[test]
    fn test_memoized_label_is_idempotent() {
        let sol = ReferenceSolution::from_values(vec![2.0]);
        let mut oracle = Oracle::new(sol);
        let node = node_with_chain(7, Some(0), vec![decision(0, BoundType::Lower, 1.0)]);

        assert!(oracle.is_optimal(&node));
        let walks = oracle.chain_walks();
        assert!(oracle.is_optimal(&node));
        // The second call answers from the cache.
        assert_eq!(oracle.chain_walks(), walks);
        assert!(oracle.checked(7));
        assert_eq!(oracle.label(7), Some(true));
    }

    #[test]
    fn test_non_optimal_parent_short_circuits() {
        let sol = ReferenceSolution::from_values(vec![2.0]);
        let mut oracle = Oracle::new(sol);

        let parent = node_with_chain(1, Some(0), vec![decision(0, BoundType::Lower, 3.0)]);
        assert!(!oracle.is_optimal(&parent));
        let walks = oracle.chain_walks();

        // The child inherits the label without a chain walk.
        let child = node_with_chain(
            2,
            Some(1),
            vec![
                decision(0, BoundType::Lower, 3.0),
                decision(0, BoundType::Upper, 5.0),
            ],
        );
        assert!(!oracle.is_optimal(&child));
        assert_eq!(oracle.chain_walks(), walks);
    }

    #[test]
    fn test_read_solution_file() {
        let mut state = StubState::new(4);
        state.set_var_names(&["x1", "x2", "x3", "x4"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opt.sol");
        // Every known header and marker line must be skipped; any of them
        // reaching the parser would fail the read.
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Log started Mon Aug 24 12:00:00 2026").unwrap();
        writeln!(file, "NAME instance.mps").unwrap();
        writeln!(file, "solution status: optimal").unwrap();
        writeln!(file, "objective value: 42.0").unwrap();
        writeln!(file, "Variable Name           Solution Value").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "x1 1.0 1.0").unwrap();
        writeln!(file, "x2 inf").unwrap();
        writeln!(file, "x3 inv").unwrap();
        writeln!(file, "All other variables are zero.").unwrap();
        writeln!(file, "ENDATA").unwrap();
        drop(file);

        let sol = ReferenceSolution::read(&path, &state).unwrap();
        assert_eq!(sol.value(0), 1.0);
        assert_eq!(sol.value(1), f64::INFINITY);
        // `inv` leaves the variable at its default.
        assert_eq!(sol.value(2), 0.0);
        assert_eq!(sol.value(3), 0.0);
    }

    #[test]
    fn test_read_solution_unknown_variable_is_ignored() {
        let mut state = StubState::new(1);
        state.set_var_names(&["x1"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opt.sol");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "x1 2.5").unwrap();
        writeln!(file, "bogus 1.0").unwrap();
        drop(file);

        let sol = ReferenceSolution::read(&path, &state).unwrap();
        assert_eq!(sol.value(0), 2.5);
    }

    #[test]
    fn test_read_solution_malformed_line_fails() {
        let mut state = StubState::new(1);
        state.set_var_names(&["x1"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opt.sol");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "x1").unwrap();
        drop(file);
        assert!(matches!(
            ReferenceSolution::read(&path, &state),
            Err(LearnError::SolutionFormat { line: 1, .. })
        ));

        let mut file = File::create(&path).unwrap();
        writeln!(file, "x1 notanumber").unwrap();
        drop(file);
        assert!(matches!(
            ReferenceSolution::read(&path, &state),
            Err(LearnError::SolutionFormat { .. })
        ));
    }

    #[test]
    fn test_read_solution_missing_file_fails() {
        let state = StubState::new(1);
        let err = ReferenceSolution::read(Path::new("/no/such/file.sol"), &state);
        assert!(matches!(err, Err(LearnError::Io { .. })));
    }
}
