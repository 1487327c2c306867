//! Branch-aware stepping over the lines of one plan block

use tracing::{debug, warn};

use super::tokens::{action_token, ActionSignature, TraceToken};
use crate::domain::DomainModel;
use crate::error::{PlanError, PlanResult, TraceWarning};
use crate::graph::{DispatchRecord, KeyValue, Node, NodeId, PlanGraph};
use crate::resolver::{observation_condition, resolve_preconditions};

/// Parser state carried from one plan line to the next
#[derive(Debug)]
pub(crate) struct TraceState {
    /// Live continuation edges; the top feeds the next action
    parent_stack: Vec<String>,
    /// Facts of observation actions still governing branches
    observation_stack: Vec<String>,
    /// Next action is gated by an observation outcome
    observation_is_active: bool,
    true_branch: bool,
    /// Last line was an action or a ramification, so `ramificate` branches
    observe_action: bool,
    shed_pending: bool,
    pub(crate) node_counter: NodeId,
    pub(crate) warnings: Vec<TraceWarning>,
}

impl TraceState {
    pub(crate) fn new(free_action_id: NodeId) -> Self {
        Self {
            parent_stack: Vec::new(),
            observation_stack: Vec::new(),
            observation_is_active: false,
            true_branch: true,
            observe_action: false,
            shed_pending: false,
            node_counter: free_action_id,
            warnings: Vec::new(),
        }
    }

    /// Process one lowercased, trimmed plan line
    pub(crate) fn step(
        &mut self,
        line_number: usize,
        line: &str,
        domain: &DomainModel,
        graph: &mut PlanGraph,
    ) -> PlanResult<()> {
        let Some(token) = action_token(line).and_then(TraceToken::classify) else {
            self.warn(TraceWarning::MalformedLine {
                line_number,
                line: line.to_string(),
            });
            return Ok(());
        };
        debug!("Process line {}: {:?}", line_number, token);

        match token {
            TraceToken::Ramificate if self.observe_action => {
                match self.parent_stack.last().cloned() {
                    Some(top) => self.parent_stack.push(top),
                    None => self.warn(TraceWarning::EmptyBranchStack {
                        line_number,
                        token: "ramificate".to_string(),
                    }),
                }
            }
            TraceToken::Ramificate => self.observe_action = true,
            TraceToken::Shed => {
                self.observe_action = false;
                self.shed_pending = true;
                self.observation_stack.clear();
                self.observation_is_active = false;
            }
            TraceToken::Pop => {
                let len = self.parent_stack.len();
                if len > 1 {
                    self.parent_stack.swap(len - 1, len - 2);
                    self.observe_action = false;
                    self.observation_is_active = true;
                    self.true_branch = false;
                } else {
                    self.warn(TraceWarning::BranchStack {
                        line_number,
                        token: action_token(line).unwrap_or_default().to_string(),
                    });
                }
            }
            TraceToken::Assume => self.observe_action = false,
            TraceToken::Action(signature) => {
                self.create_node(line_number, signature, domain, graph)?;
                self.observe_action = true;
            }
        }
        Ok(())
    }

    fn create_node(
        &mut self,
        line_number: usize,
        signature: ActionSignature,
        domain: &DomainModel,
        graph: &mut PlanGraph,
    ) -> PlanResult<()> {
        let labels = domain.operator_params(&signature.operator)?;
        if signature.arguments.len() > labels.len() {
            return Err(PlanError::ArityMismatch {
                operator: signature.operator.clone(),
                expected: labels.len(),
                found: signature.arguments.len(),
            });
        }
        let parameters = labels
            .iter()
            .zip(&signature.arguments)
            .map(|(label, value)| KeyValue::new(label.clone(), value.clone()))
            .collect();

        let id = self.node_counter;
        self.node_counter += 1;

        let name = signature.to_string();
        debug!("Created plan node: [{}] {}", id, name);
        let mut node = Node::new(
            id,
            name.clone(),
            DispatchRecord::new(id, signature.operator.clone(), parameters),
        );

        // incoming edges: the live continuation, plus the merged branch after a shed
        if let Some(parent) = self.parent_stack.pop() {
            graph.connect(&parent, id);
            node.push_input(parent);
        }
        if self.shed_pending {
            if let Some(parent) = self.parent_stack.pop() {
                graph.connect(&parent, id);
                node.push_input(parent);
            }
            self.shed_pending = false;
        }

        let own_edge = graph.add_action_edge(&format!("e{}", id), id);
        node.output.push(own_edge.clone());
        self.parent_stack.push(own_edge);

        resolve_preconditions(&mut node, domain, graph)?;

        if self.observation_is_active {
            match self.observation_stack.last().cloned() {
                Some(fact) => {
                    let edge = format!(
                        "observe-edge-{}-{}",
                        if self.true_branch { "true" } else { "false" },
                        fact
                    );
                    let condition = observation_condition(&fact, self.true_branch, domain)?;
                    node.push_input(graph.register_condition(&edge, id, condition));
                }
                None => self.warn(TraceWarning::MissingObservation {
                    line_number,
                    action: name,
                }),
            }
            self.observation_is_active = false;
        }

        if let Some(fact) = signature.observed_fact() {
            self.observation_stack.push(fact);
            self.observation_is_active = true;
            self.true_branch = true;
        }

        graph.insert_node(node);
        Ok(())
    }

    fn warn(&mut self, warning: TraceWarning) {
        warn!("Error parsing plan: {}", warning);
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> DomainModel {
        DomainModel::new()
            .with_predicate("at", ["r", "l"])
            .with_operator("move", ["r", "from", "to"])
            .with_operator("observe-at", ["r", "l"])
    }

    #[test]
    fn test_pop_on_shallow_stack_is_reported() {
        let mut state = TraceState::new(0);
        let mut graph = PlanGraph::new();
        state
            .step(1, "0: move robot1 a b", &domain(), &mut graph)
            .unwrap();
        state.step(2, "1: pop", &domain(), &mut graph).unwrap();

        assert_eq!(
            state.warnings,
            vec![TraceWarning::BranchStack {
                line_number: 2,
                token: "pop".to_string()
            }]
        );
        assert_eq!(state.parent_stack, vec!["e0".to_string()]);
    }

    #[test]
    fn test_ramificate_duplicates_top_after_action() {
        let mut state = TraceState::new(0);
        let mut graph = PlanGraph::new();
        state
            .step(1, "0: move robot1 a b", &domain(), &mut graph)
            .unwrap();
        state.step(2, "1: ramificate", &domain(), &mut graph).unwrap();
        assert_eq!(state.parent_stack, vec!["e0".to_string(), "e0".to_string()]);
    }

    #[test]
    fn test_ramificate_on_empty_stack_is_reported() {
        let mut state = TraceState::new(0);
        let mut graph = PlanGraph::new();
        let domain = domain();
        state.step(1, "0: ramificate", &domain, &mut graph).unwrap();
        state.step(2, "1: ramificate", &domain, &mut graph).unwrap();
        state.step(3, "2: move robot1 a b", &domain, &mut graph).unwrap();

        assert_eq!(
            state.warnings,
            vec![TraceWarning::EmptyBranchStack {
                line_number: 2,
                token: "ramificate".to_string()
            }]
        );
        let node = graph.node(0).unwrap();
        assert!(node.input.is_empty());
        assert_eq!(state.parent_stack, vec!["e0".to_string()]);
    }

    #[test]
    fn test_shed_after_ramificate_merges_once() {
        let mut state = TraceState::new(0);
        let mut graph = PlanGraph::new();
        let domain = domain();
        state.step(1, "0: move robot1 a b", &domain, &mut graph).unwrap();
        state.step(2, "1: ramificate", &domain, &mut graph).unwrap();
        state.step(3, "2: shed", &domain, &mut graph).unwrap();
        state.step(4, "3: move robot1 b a", &domain, &mut graph).unwrap();

        let node = graph.node(1).unwrap();
        assert_eq!(node.input_edges().collect::<Vec<_>>(), vec!["e0"]);
        assert_eq!(state.parent_stack, vec!["e1".to_string()]);
    }

    #[test]
    fn test_arity_mismatch_is_fatal() {
        let mut state = TraceState::new(0);
        let mut graph = PlanGraph::new();
        let err = state
            .step(1, "0: move robot1 a b c", &domain(), &mut graph)
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::ArityMismatch {
                expected: 3,
                found: 4,
                ..
            }
        ));
        assert_eq!(state.node_counter, 0);
    }

    #[test]
    fn test_observation_without_pending_fact_is_reported() {
        let mut state = TraceState::new(0);
        let mut graph = PlanGraph::new();
        state.observation_is_active = true;
        state
            .step(1, "0: move robot1 a b", &domain(), &mut graph)
            .unwrap();
        assert!(matches!(
            state.warnings.as_slice(),
            [TraceWarning::MissingObservation { .. }]
        ));
        assert!(!state.observation_is_active);
    }
}
