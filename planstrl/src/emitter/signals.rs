use std::collections::{BTreeMap, HashSet};

use crate::graph::PlanGraph;
use crate::utils::sanitize_identifier;

/// Esterel reserved words an edge name must not turn into
const RESERVED: &[&str] = &[
    "abort", "await", "call", "case", "constant", "do", "each", "else", "elsif", "emit", "end",
    "every", "exec", "exit", "function", "halt", "handle", "if", "immediate", "in", "input",
    "inputoutput", "loop", "module", "not", "nothing", "or", "output", "pause", "present",
    "procedure", "relation", "repeat", "return", "run", "sensor", "signal", "suspend", "sustain",
    "task", "then", "timeout", "trap", "type", "upto", "var", "watching", "weak", "when", "with",
    "and", "copymodule", "positive", "pre", "finalize", "abstract", "tick",
];

/// One-to-one mapping from edge names to Esterel signal identifiers
#[derive(Debug, Clone, Default)]
pub struct SignalTable {
    by_edge: BTreeMap<String, String>,
}

impl SignalTable {
    /// Assign identifiers to every edge of `graph`, in edge-name order
    ///
    /// Interface signals (`SOURCE`, `SINK`, `a<id>_dispatch`, `a<id>_complete`)
    /// are reserved so no edge can shadow them.
    pub fn from_graph(graph: &PlanGraph) -> Self {
        let mut used: HashSet<String> = ["SOURCE", "SINK"].iter().map(|s| s.to_string()).collect();
        for node in graph.nodes() {
            used.insert(node.dispatch_signal());
            used.insert(node.complete_signal());
            used.insert(node.module_name());
        }

        let mut by_edge = BTreeMap::new();
        for edge in graph.edges() {
            let mut base = sanitize_identifier(edge.name());
            if RESERVED.contains(&base.to_lowercase().as_str()) {
                base.push_str("_sig");
            }
            let mut candidate = base.clone();
            let mut suffix = 1;
            while used.contains(&candidate) {
                candidate = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            used.insert(candidate.clone());
            by_edge.insert(edge.name().to_string(), candidate);
        }
        Self { by_edge }
    }

    /// Identifier for `edge`; unknown names pass through sanitized
    pub fn signal(&self, edge: &str) -> String {
        self.by_edge
            .get(edge)
            .cloned()
            .unwrap_or_else(|| sanitize_identifier(edge))
    }

    /// Identifiers in edge-name order
    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.by_edge.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_edge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_edge.is_empty()
    }
}
