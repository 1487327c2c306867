//! Esterel controller emission
//!
//! Lowers a plan graph into a synchronous program: a top `plan` module that
//! scopes one signal per edge and runs every action module in parallel, and
//! one `action<id>` module per node that awaits its inputs, emits its
//! dispatch signal, awaits completion and then emits its outputs.

mod signals;

use std::path::Path;

use itertools::Itertools;
use tracing::info;

pub use signals::SignalTable;

use crate::error::PlanResult;
use crate::graph::{Node, PlanGraph};
use crate::utils::write_atomically;

const INDENT: &str = "  ";

pub struct EsterelEmitter<'a> {
    graph: &'a PlanGraph,
    signals: SignalTable,
}

impl<'a> EsterelEmitter<'a> {
    pub fn new(graph: &'a PlanGraph) -> Self {
        Self {
            graph,
            signals: SignalTable::from_graph(graph),
        }
    }

    pub fn signals(&self) -> &SignalTable {
        &self.signals
    }

    pub fn emit(&self) -> String {
        let mut out = String::new();
        self.emit_plan_module(&mut out);
        for node in self.graph.nodes() {
            self.emit_action_module(node, &mut out);
        }
        out
    }

    /// Write the program to `path`, all or nothing
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> PlanResult<()> {
        let path = path.as_ref();
        info!("Write the esterel plan: {}", path.display());
        write_atomically(path, self.emit().as_bytes())
    }

    fn emit_plan_module(&self, out: &mut String) {
        out.push_str("module plan:\n");

        let inputs = std::iter::once("SOURCE".to_string())
            .chain(self.graph.nodes().map(Node::complete_signal))
            .join(", ");
        out.push_str(&format!("input {};\n", inputs));

        let outputs = std::iter::once("SINK".to_string())
            .chain(self.graph.nodes().map(Node::dispatch_signal))
            .join(", ");
        out.push_str(&format!("output {};\n\n", outputs));

        let body_depth = if self.signals.is_empty() { 1 } else { 2 };
        if !self.signals.is_empty() {
            out.push_str(&format!(
                "{}signal {} in\n",
                INDENT,
                self.signals.signals().join(", ")
            ));
        }

        let runs: Vec<String> = self
            .graph
            .nodes()
            .map(|n| format!("run {}", n.module_name()))
            .collect();
        let pad = INDENT.repeat(body_depth);
        match runs.len() {
            0 => out.push_str(&format!("{}nothing\n", pad)),
            1 => out.push_str(&format!("{}{}\n", pad, runs[0])),
            _ => {
                out.push_str(&format!("{}[\n", pad));
                let separator = format!("{}||\n", pad);
                let branches = runs
                    .iter()
                    .map(|run| format!("{}{}{}\n", pad, INDENT, run))
                    .join(&separator);
                out.push_str(&branches);
                out.push_str(&format!("{}]\n", pad));
            }
        }

        if !self.signals.is_empty() {
            out.push_str(&format!("{}end signal\n", INDENT));
        }
        out.push_str("end module\n\n");
    }

    fn emit_action_module(&self, node: &Node, out: &mut String) {
        out.push_str(&format!("module {}:\n", node.module_name()));

        let inputs: Vec<String> = node
            .input_edges()
            .map(|edge| self.signals.signal(edge))
            .collect();
        let outputs: Vec<String> = node
            .output
            .iter()
            .map(|edge| self.signals.signal(edge))
            .collect();

        let declared_inputs = inputs
            .iter()
            .cloned()
            .chain([node.complete_signal()])
            .join(", ");
        out.push_str(&format!("input {};\n", declared_inputs));
        let declared_outputs = outputs
            .iter()
            .cloned()
            .chain([node.dispatch_signal()])
            .join(", ");
        out.push_str(&format!("output {};\n\n", declared_outputs));

        let mut statements = Vec::new();
        match inputs.len() {
            0 => {}
            1 => statements.push(format!("await {}", inputs[0])),
            _ => statements.push(format!("await [{}]", inputs.join(" or "))),
        }
        statements.push(format!("emit {}", node.dispatch_signal()));
        statements.push(format!("await {}", node.complete_signal()));
        statements.extend(outputs.iter().map(|signal| format!("emit {}", signal)));

        let body = statements
            .iter()
            .map(|s| format!("{}{}", INDENT, s))
            .join(";\n");
        out.push_str(&body);
        out.push_str("\nend module\n\n");
    }
}

/// Render `graph` as an Esterel program
pub fn produce_esterel(graph: &PlanGraph) -> String {
    EsterelEmitter::new(graph).emit()
}
