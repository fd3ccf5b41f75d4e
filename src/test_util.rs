//! Shared test fixtures: a scriptable engine state and small file writers.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::search::{
    BoundType, BranchDirection, BranchingDecision, Node, NodeKind, SearchState,
};

/// A fully scriptable [`SearchState`] for tests.
///
/// All fields are public; tests set exactly what the code under test reads.
/// Variables are named `x0`, `x1`, ... by default.
pub struct StubState {
    pub num_vars: usize,
    pub num_discrete: usize,
    pub var_names: Vec<String>,
    pub global_lower_bound: f64,
    pub global_upper_bound: f64,
    pub root_lower_bound: f64,
    pub incumbents: u64,
    pub plunge_depth: usize,
    pub relaxation: Vec<f64>,
    pub root_relaxation: Vec<f64>,
    pub objective: Vec<f64>,
    pub preference: Vec<Option<BranchDirection>>,
    pub pseudocost_per_unit: Vec<f64>,
    pub inferences_up: Vec<f64>,
    pub inferences_down: Vec<f64>,
}

impl StubState {
    /// A state with `n` variables, all statistics zeroed.
    pub fn new(n: usize) -> Self {
        Self {
            num_vars: n,
            num_discrete: n,
            var_names: (0..n).map(|i| format!("x{i}")).collect(),
            global_lower_bound: 0.0,
            global_upper_bound: f64::INFINITY,
            root_lower_bound: 0.0,
            incumbents: 0,
            plunge_depth: 0,
            relaxation: vec![0.0; n],
            root_relaxation: vec![0.0; n],
            objective: vec![1.0; n],
            preference: vec![None; n],
            pseudocost_per_unit: vec![0.0; n],
            inferences_up: vec![0.0; n],
            inferences_down: vec![0.0; n],
        }
    }

    /// Replace the variable names.
    pub fn set_var_names(&mut self, names: &[&str]) {
        self.var_names = names.iter().map(|n| n.to_string()).collect();
    }
}

impl SearchState for StubState {
    fn num_decision_vars(&self) -> usize {
        self.num_vars
    }

    fn num_discrete_vars(&self) -> usize {
        self.num_discrete
    }

    fn var_index(&self, name: &str) -> Option<usize> {
        self.var_names.iter().position(|n| n == name)
    }

    fn global_lower_bound(&self) -> f64 {
        self.global_lower_bound
    }

    fn global_upper_bound(&self) -> f64 {
        self.global_upper_bound
    }

    fn root_lower_bound(&self) -> f64 {
        self.root_lower_bound
    }

    fn incumbents_found(&self) -> u64 {
        self.incumbents
    }

    fn plunge_depth(&self) -> usize {
        self.plunge_depth
    }

    fn relaxation_value(&self, var: usize) -> f64 {
        self.relaxation[var]
    }

    fn root_relaxation_value(&self, var: usize) -> f64 {
        self.root_relaxation[var]
    }

    fn objective_coefficient(&self, var: usize) -> f64 {
        self.objective[var]
    }

    fn branch_preference(&self, var: usize) -> Option<BranchDirection> {
        self.preference[var]
    }

    fn pseudocost(&self, var: usize, delta: f64) -> f64 {
        self.pseudocost_per_unit[var] * delta
    }

    fn avg_inferences(&self, var: usize, dir: BranchDirection) -> f64 {
        match dir {
            BranchDirection::Up => self.inferences_up[var],
            BranchDirection::Down => self.inferences_down[var],
        }
    }
}

/// The root node.
pub fn root_node() -> Node {
    Node {
        id: 0,
        parent_id: None,
        depth: 0,
        kind: NodeKind::Root,
        lower_bound: 0.0,
        estimate: 0.0,
        branchings: Vec::new(),
    }
}

/// A child node at the given depth, branched on variable 3.
///
/// The branching chain repeats the final decision so its length matches
/// the depth.
pub fn child_node(
    id: u64,
    depth: usize,
    lower_bound: f64,
    estimate: f64,
    bound_type: BoundType,
    bound: f64,
) -> Node {
    let decision = BranchingDecision {
        var: 3,
        bound_type,
        bound,
    };
    Node {
        id,
        parent_id: Some(0),
        depth,
        kind: NodeKind::Child,
        lower_bound,
        estimate,
        branchings: vec![decision; depth],
    }
}

/// Write a libsvm-style model file: six header lines, then one weight
/// per line.
pub fn write_policy_file(path: &Path, weights: &[f64]) {
    let mut file = File::create(path).unwrap();
    for i in 0..6 {
        writeln!(file, "header line {i}").unwrap();
    }
    for w in weights {
        writeln!(file, "{w}").unwrap();
    }
}

/// Write a solution file with a status header and `<name> <value>` lines.
pub fn write_solution_file(path: &Path, entries: &[(&str, &str)]) {
    let mut file = File::create(path).unwrap();
    writeln!(file, "solution status: optimal").unwrap();
    writeln!(file, "objective value: 0.0").unwrap();
    for (name, value) in entries {
        writeln!(file, "{name} {value}").unwrap();
    }
}
