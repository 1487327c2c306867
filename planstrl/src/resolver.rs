//! Condition resolver
//!
//! Turns the precondition tuples of an action's operator into ground
//! knowledge conditions, each registered as a CONDITION edge feeding the node.

use tracing::{debug, warn};

use crate::domain::DomainModel;
use crate::error::PlanResult;
use crate::graph::{Condition, KeyValue, KnowledgeKind, Node, PlanGraph};

/// Marker predicate the planner uses for axiom resolution; never stripped
const RESOLVE_AXIOMS: &str = "resolve-axioms";

/// A CONDITION edge produced for one node
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCondition {
    pub edge: String,
    pub condition: Condition,
}

/// Resolve and register the preconditions gating `node`
///
/// Every produced edge is registered in `graph` with the node as sink and
/// appended to `node.input`. Two tuples that ground to the same attribute
/// and values yield a single edge.
pub fn resolve_preconditions(
    node: &mut Node,
    domain: &DomainModel,
    graph: &mut PlanGraph,
) -> PlanResult<Vec<ResolvedCondition>> {
    let operator = node.dispatch.name.to_lowercase();
    let tuples = domain.preconditions(&operator)?;

    let mut resolved: Vec<ResolvedCondition> = Vec::new();
    for tuple in tuples {
        let Some((raw_attribute, arguments)) = tuple.split_first() else {
            continue;
        };
        let raw_attribute = raw_attribute.to_lowercase();
        let attribute_name = strip_resolution_marker(domain, &raw_attribute);

        let kind = if domain.is_function(&raw_attribute) || domain.is_function(&attribute_name) {
            KnowledgeKind::Function
        } else {
            KnowledgeKind::Fact
        };

        let labels = domain.attribute_params(&attribute_name)?;
        let values = labels
            .iter()
            .enumerate()
            .map(|(position, label)| {
                let value = match arguments.get(position) {
                    Some(argument) => bind_argument(argument, node),
                    None => {
                        warn!(
                            "Precondition '{}' of '{}' has no argument for '{}'",
                            attribute_name, operator, label
                        );
                        String::new()
                    }
                };
                KeyValue::new(label.clone(), value)
            })
            .collect();

        let condition = Condition {
            kind,
            attribute_name,
            is_negative: false,
            values,
        };

        if resolved
            .iter()
            .any(|r| r.condition.same_requirement(&condition))
        {
            debug!(
                "Skipping duplicate precondition '{}' of node {}",
                condition.signature(),
                node.id
            );
            continue;
        }

        let edge = graph.register_condition(&condition.signature(), node.id, condition.clone());
        node.push_input(edge.clone());
        resolved.push(ResolvedCondition { edge, condition });
    }

    Ok(resolved)
}

/// Build the condition behind an observation outcome edge
///
/// `fact` is the observed atom as written after `observe-`, e.g.
/// `at robot1 rooma`. Tokens after the predicate bind to its labels in
/// declaration order.
pub fn observation_condition(
    fact: &str,
    true_branch: bool,
    domain: &DomainModel,
) -> PlanResult<Condition> {
    let mut tokens = fact.split_whitespace();
    let attribute_name = tokens.next().unwrap_or_default().to_string();
    let labels = domain.attribute_params(&attribute_name)?;

    let values = labels
        .iter()
        .map(|label| KeyValue::new(label.clone(), tokens.next().unwrap_or_default()))
        .collect();

    Ok(Condition {
        kind: KnowledgeKind::Fact,
        attribute_name,
        is_negative: !true_branch,
        values,
    })
}

/// Map an axiom-resolution atom (`r<predicate>`) back to its predicate
///
/// A name the domain declares as-is is kept unless the stripped form is
/// declared too, so predicates that merely begin with `r` survive.
fn strip_resolution_marker(domain: &DomainModel, attribute: &str) -> String {
    if attribute == RESOLVE_AXIOMS {
        return attribute.to_string();
    }
    let Some(stripped) = attribute.strip_prefix('r') else {
        return attribute.to_string();
    };
    let declared = |name: &str| domain.is_predicate(name) || domain.is_function(name);
    if declared(attribute) && !declared(stripped) {
        attribute.to_string()
    } else {
        stripped.to_string()
    }
}

/// Ground a precondition argument label against the node's dispatch parameters
///
/// Labels that match no parameter are domain constants and stand for themselves.
fn bind_argument(argument: &str, node: &Node) -> String {
    let label = argument.to_lowercase();
    node.dispatch
        .parameters
        .iter()
        .rev()
        .find(|kv| kv.key.to_lowercase() == label)
        .map(|kv| kv.value.clone())
        .unwrap_or(label)
}
