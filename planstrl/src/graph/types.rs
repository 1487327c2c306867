use serde::{Deserialize, Serialize};

/// Action instance identifier, assigned from the caller's free action id upwards
pub type NodeId = usize;

/// Parameter label paired with its ground value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Payload an executor receives to perform one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub action_id: NodeId,
    pub name: String,
    pub duration: f64,
    pub dispatch_time: f64,
    pub parameters: Vec<KeyValue>,
}

impl DispatchRecord {
    /// Placeholder duration; planner traces carry no timing
    pub const DEFAULT_DURATION: f64 = 0.1;

    pub fn new(action_id: NodeId, name: impl Into<String>, parameters: Vec<KeyValue>) -> Self {
        Self {
            action_id,
            name: name.into(),
            duration: Self::DEFAULT_DURATION,
            dispatch_time: 0.0,
            parameters,
        }
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KnowledgeKind {
    Fact,
    Function,
}

/// Knowledge requirement attached to a CONDITION edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: KnowledgeKind,
    pub attribute_name: String,
    pub is_negative: bool,
    pub values: Vec<KeyValue>,
}

impl Condition {
    /// Same attribute and identical ordered values
    pub fn same_requirement(&self, other: &Condition) -> bool {
        self.attribute_name == other.attribute_name
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.value == b.value)
    }

    /// Ground form used as the edge name, e.g. `at robot1 rooma`
    pub fn signature(&self) -> String {
        let mut signature = self.attribute_name.clone();
        for kv in self.values.iter().filter(|kv| !kv.value.is_empty()) {
            signature.push(' ');
            signature.push_str(&kv.value);
        }
        signature
    }
}

/// An edge the node waits on before dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInput {
    pub edge: String,
    pub awaited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Lowercased action signature as it appeared in the trace
    pub name: String,
    pub input: Vec<NodeInput>,
    pub output: Vec<String>,
    pub dispatch: DispatchRecord,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, dispatch: DispatchRecord) -> Self {
        Self {
            id,
            name: name.into(),
            input: Vec::new(),
            output: Vec::new(),
            dispatch,
        }
    }

    /// Add an input edge; an edge already listed is not added twice
    pub fn push_input(&mut self, edge: impl Into<String>) {
        let edge = edge.into();
        if !self.has_input(&edge) {
            self.input.push(NodeInput {
                edge,
                awaited: false,
            });
        }
    }

    pub fn input_edges(&self) -> impl Iterator<Item = &str> {
        self.input.iter().map(|i| i.edge.as_str())
    }

    pub fn has_input(&self, edge: &str) -> bool {
        self.input.iter().any(|i| i.edge == edge)
    }

    pub fn dispatch_signal(&self) -> String {
        format!("a{}_dispatch", self.id)
    }

    pub fn complete_signal(&self) -> String {
        format!("a{}_complete", self.id)
    }

    pub fn module_name(&self) -> String {
        format!("action{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Action,
    Condition,
}

/// Completion edge produced by one action node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEdge {
    pub name: String,
    pub sources: Vec<NodeId>,
    pub sinks: Vec<NodeId>,
    pub active: bool,
}

/// Knowledge edge gating one or more action nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEdge {
    pub name: String,
    pub sinks: Vec<NodeId>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Action(ActionEdge),
    Condition(ConditionEdge),
}

impl Edge {
    pub fn name(&self) -> &str {
        match self {
            Edge::Action(e) => &e.name,
            Edge::Condition(e) => &e.name,
        }
    }

    pub fn kind(&self) -> EdgeKind {
        match self {
            Edge::Action(_) => EdgeKind::Action,
            Edge::Condition(_) => EdgeKind::Condition,
        }
    }

    pub fn sinks(&self) -> &[NodeId] {
        match self {
            Edge::Action(e) => &e.sinks,
            Edge::Condition(e) => &e.sinks,
        }
    }

    /// Producers; condition edges are fed by the environment, not by nodes
    pub fn sources(&self) -> &[NodeId] {
        match self {
            Edge::Action(e) => &e.sources,
            Edge::Condition(_) => &[],
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Edge::Action(e) => e.active,
            Edge::Condition(e) => e.active,
        }
    }

    pub(crate) fn add_sink(&mut self, node: NodeId) {
        let sinks = match self {
            Edge::Action(e) => &mut e.sinks,
            Edge::Condition(e) => &mut e.sinks,
        };
        if !sinks.contains(&node) {
            sinks.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(values: &[&str]) -> Condition {
        Condition {
            kind: KnowledgeKind::Fact,
            attribute_name: "at".to_string(),
            is_negative: false,
            values: values
                .iter()
                .enumerate()
                .map(|(i, v)| KeyValue::new(format!("p{}", i), *v))
                .collect(),
        }
    }

    #[test]
    fn test_same_requirement_ignores_labels() {
        let mut other = at(&["robot1", "rooma"]);
        other.values[0].key = "r".to_string();
        assert!(at(&["robot1", "rooma"]).same_requirement(&other));
        assert!(!at(&["robot1", "roomb"]).same_requirement(&other));
    }

    #[test]
    fn test_signature_skips_unbound_values() {
        assert_eq!(at(&["robot1", ""]).signature(), "at robot1");
        assert_eq!(at(&[]).signature(), "at");
    }

    #[test]
    fn test_add_sink_is_idempotent() {
        let mut edge = Edge::Condition(ConditionEdge {
            name: "at robot1 rooma".to_string(),
            sinks: vec![],
            active: false,
        });
        edge.add_sink(3);
        edge.add_sink(3);
        assert_eq!(edge.sinks(), &[3]);
        assert!(edge.sources().is_empty());
    }

    #[test]
    fn test_condition_kind_serializes_upper_case() {
        let json = serde_json::to_string(&KnowledgeKind::Function).unwrap();
        assert_eq!(json, "\"FUNCTION\"");
    }
}
