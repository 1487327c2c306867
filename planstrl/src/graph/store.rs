use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

use super::types::{ActionEdge, Condition, ConditionEdge, Edge, EdgeKind, Node, NodeId};

/// Nodes, edges and edge conditions of one parsed plan
///
/// Owned by a single parser; both the trace stepper and the condition
/// resolver borrow it mutably. Nodes iterate by id, edges and conditions by
/// edge name, which keeps emission deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanGraph {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<String, Edge>,
    conditions: BTreeMap<String, Condition>,
}

impl PlanGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.conditions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// First node whose trace signature is `name`
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.name == name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edge(&self, name: &str) -> Option<&Edge> {
        self.edges.get(name)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn condition(&self, edge: &str) -> Option<&Condition> {
        self.conditions.get(edge)
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Register the completion edge of `source` and return its final name
    pub(crate) fn add_action_edge(&mut self, name: &str, source: NodeId) -> String {
        let name = self.name_for(name, EdgeKind::Action);
        self.edges.insert(
            name.clone(),
            Edge::Action(ActionEdge {
                name: name.clone(),
                sources: vec![source],
                sinks: Vec::new(),
                active: false,
            }),
        );
        name
    }

    /// Make `sink` a consumer of an existing edge; false if the edge is unknown
    pub(crate) fn connect(&mut self, edge: &str, sink: NodeId) -> bool {
        match self.edges.get_mut(edge) {
            Some(e) => {
                e.add_sink(sink);
                true
            }
            None => false,
        }
    }

    /// Register a CONDITION edge feeding `sink` and return its final name
    ///
    /// A name that is already registered gains `sink` as an extra consumer and
    /// keeps its first condition record.
    pub(crate) fn register_condition(
        &mut self,
        name: &str,
        sink: NodeId,
        condition: Condition,
    ) -> String {
        let name = self.name_for(name, EdgeKind::Condition);
        self.edges
            .entry(name.clone())
            .or_insert_with(|| {
                Edge::Condition(ConditionEdge {
                    name: name.clone(),
                    sinks: Vec::new(),
                    active: false,
                })
            })
            .add_sink(sink);
        self.conditions.entry(name.clone()).or_insert(condition);
        name
    }

    /// `name`, or a suffixed variant when an edge of the other kind holds it
    ///
    /// A zero-arity predicate such as `e3` must not merge with the ACTION edge
    /// of node 3. The mapping is stable: later lookups of the same name and
    /// kind land on the same variant.
    fn name_for(&self, name: &str, kind: EdgeKind) -> String {
        let suffix = match kind {
            EdgeKind::Action => "action",
            EdgeKind::Condition => "condition",
        };
        let mut candidate = name.to_string();
        let mut attempt = 0;
        while let Some(existing) = self.edges.get(&candidate) {
            if existing.kind() == kind {
                break;
            }
            candidate = match attempt {
                0 => format!("{}-{}", name, suffix),
                n => format!("{}-{}-{}", name, suffix, n),
            };
            attempt += 1;
        }
        candidate
    }
}

impl fmt::Display for PlanGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "plan: {} nodes, {} edges",
            self.nodes.len(),
            self.edges.len()
        )?;
        for node in self.nodes.values() {
            let params = node
                .dispatch
                .parameters
                .iter()
                .map(|kv| format!("{}={}", kv.key, kv.value))
                .join(" ");
            writeln!(f, "[{}] {} ({})", node.id, node.dispatch.name, params)?;
            writeln!(f, "    in:  {}", node.input_edges().join(", "))?;
            writeln!(f, "    out: {}", node.output.join(", "))?;
        }
        Ok(())
    }
}
