//! Plan trace parser
//!
//! Reads the contingent planner's textual output and builds the plan graph:
//! one node per action occurrence, an ACTION edge per node marking its
//! completion, and CONDITION edges for preconditions and observation outcomes.
//! Branch administration lines (`ramificate`, `shed`, `pop`, `assume`) only
//! steer which continuation edge feeds the next action.

mod state;
pub mod tokens;

use std::path::Path;

use tracing::{info, warn};

pub use tokens::{ActionSignature, TraceToken, PLAN_FOUND_SENTINEL, TIME_SPENT_MARKER};

use crate::config::PlanstrlConfig;
use crate::domain::DomainModel;
use crate::emitter::EsterelEmitter;
use crate::error::{PlanError, PlanResult, TraceWarning};
use crate::graph::{NodeId, PlanGraph};
use state::TraceState;

/// Outcome of one `prepare_plan` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    /// Whether the trace announced a legal plan
    pub plan_found: bool,
    pub node_count: usize,
    /// First id not used by this plan
    pub next_free_action_id: NodeId,
    pub warnings: Vec<TraceWarning>,
}

impl ParseReport {
    fn empty(free_action_id: NodeId) -> Self {
        Self {
            plan_found: false,
            node_count: 0,
            next_free_action_id: free_action_id,
            warnings: Vec::new(),
        }
    }
}

/// Parser for plans written by the CFF contingent planner
#[derive(Debug, Default)]
pub struct CffPlanParser {
    graph: PlanGraph,
}

impl CffPlanParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &PlanGraph {
        &self.graph
    }

    pub fn into_graph(self) -> PlanGraph {
        self.graph
    }

    pub fn reset(&mut self) {
        self.graph.reset();
    }

    /// Parse an in-memory trace, replacing any previously parsed plan
    ///
    /// Only the first plan block is read. A trace without the plan-found
    /// sentinel leaves the graph empty and reports `plan_found == false`.
    /// On error the graph is left empty.
    pub fn prepare_plan(
        &mut self,
        trace: &str,
        domain: &DomainModel,
        free_action_id: NodeId,
    ) -> PlanResult<ParseReport> {
        self.reset();
        let mut report = ParseReport::empty(free_action_id);

        let mut lines = trace.lines().enumerate();
        let plan_found = lines
            .by_ref()
            .any(|(_, line)| line.trim().eq_ignore_ascii_case(PLAN_FOUND_SENTINEL));
        if !plan_found {
            warn!("No legal plan found in trace");
            return Ok(report);
        }
        report.plan_found = true;

        // built aside so a fatal error leaves the parser with an empty graph
        let mut graph = PlanGraph::new();
        let mut state = TraceState::new(free_action_id);
        for (index, raw) in lines {
            let line = raw.trim().to_lowercase();
            if line.starts_with(TIME_SPENT_MARKER) {
                break;
            }
            if line.is_empty() {
                continue;
            }
            state.step(index + 1, &line, domain, &mut graph)?;
        }
        self.graph = graph;

        report.node_count = self.graph.node_count();
        report.next_free_action_id = state.node_counter;
        report.warnings = state.warnings;
        info!(
            "Parsed plan: {} nodes, {} edges, {} warnings",
            report.node_count,
            self.graph.edge_count(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Read a trace file and parse it
    pub fn prepare_plan_from_file(
        &mut self,
        path: impl AsRef<Path>,
        domain: &DomainModel,
        free_action_id: NodeId,
    ) -> PlanResult<ParseReport> {
        let path = path.as_ref();
        info!(
            "Loading plan from file: {}. Initial action ID: {}",
            path.display(),
            free_action_id
        );
        let trace = std::fs::read_to_string(path).map_err(|e| PlanError::io(path, e))?;
        self.prepare_plan(&trace, domain, free_action_id)
    }

    /// Parse the trace the configuration points at
    pub fn prepare_plan_from_config(
        &mut self,
        config: &PlanstrlConfig,
        domain: &DomainModel,
    ) -> PlanResult<ParseReport> {
        self.prepare_plan_from_file(config.plan_path(), domain, config.free_action_id)
    }

    /// Render the current graph as an Esterel controller
    pub fn produce_esterel(&self) -> String {
        EsterelEmitter::new(&self.graph).emit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> DomainModel {
        DomainModel::new()
            .with_predicate("at", ["r", "l"])
            .with_operator("move", ["r", "from", "to"])
    }

    #[test]
    fn test_second_call_replaces_graph() {
        let mut parser = CffPlanParser::new();
        let trace = "ff: found legal plan as follows\nstep 0: move r1 a b\ntime spent: 0.1";
        parser.prepare_plan(trace, &domain(), 0).unwrap();
        let report = parser.prepare_plan(trace, &domain(), 10).unwrap();

        assert_eq!(report.node_count, 1);
        assert_eq!(report.next_free_action_id, 11);
        assert!(parser.graph().node(0).is_none());
        assert!(parser.graph().node(10).is_some());
    }

    #[test]
    fn test_lines_after_time_spent_are_ignored() {
        let mut parser = CffPlanParser::new();
        let trace = "FF: found legal plan as follows\n0: MOVE R1 A B\nTime spent: 0.00 seconds\n1: move r1 b a";
        let report = parser.prepare_plan(trace, &domain(), 0).unwrap();
        assert_eq!(report.node_count, 1);
        assert_eq!(parser.graph().node(0).unwrap().name, "move r1 a b");
    }

    #[test]
    fn test_missing_trace_file_is_io_error() {
        let mut parser = CffPlanParser::new();
        let dir = tempfile::tempdir().unwrap();
        let err = parser
            .prepare_plan_from_file(dir.path().join("plan.pddl"), &domain(), 0)
            .unwrap_err();
        assert!(matches!(err, PlanError::Io { .. }));
    }
}
