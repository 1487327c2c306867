//! Domain model tables consumed by the plan parser
//!
//! Only the four lookup tables extracted from a PDDL domain are modelled here:
//! predicate, function and operator parameter labels, and the precondition
//! tuples of every operator. Producing them from PDDL is someone else's job;
//! they can be built in code or loaded from a JSON/TOML document.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{LookupKind, PlanError, PlanResult};

/// A precondition tuple: `[attribute, arg-label, arg-label, ...]`
pub type ConditionTuple = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainModel {
    pub predicates: IndexMap<String, Vec<String>>,
    pub functions: IndexMap<String, Vec<String>>,
    pub operators: IndexMap<String, Vec<String>>,
    pub preconditions: IndexMap<String, Vec<ConditionTuple>>,
}

impl DomainModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicate<I, S>(mut self, name: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates
            .insert(name.to_lowercase(), collect_labels(params));
        self
    }

    pub fn with_function<I, S>(mut self, name: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions
            .insert(name.to_lowercase(), collect_labels(params));
        self
    }

    pub fn with_operator<I, S>(mut self, name: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operators
            .insert(name.to_lowercase(), collect_labels(params));
        self.preconditions.entry(name.to_lowercase()).or_default();
        self
    }

    /// Append one precondition tuple to `operator`
    pub fn with_precondition<I, S>(mut self, operator: &str, tuple: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preconditions
            .entry(operator.to_lowercase())
            .or_default()
            .push(tuple.into_iter().map(Into::into).collect());
        self
    }

    /// Load the tables from a `.json` document, or TOML for any other extension
    pub fn load_from_file(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::io(path, e))?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let model: DomainModel = if is_json {
            serde_json::from_str(&content).map_err(|e| PlanError::DomainFormat {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            toml::from_str(&content).map_err(|e| PlanError::DomainFormat {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };
        Ok(model.normalized())
    }

    /// Lowercase every table key so lookups match lowercased trace text
    pub fn normalized(self) -> Self {
        fn lower<V>(table: IndexMap<String, V>) -> IndexMap<String, V> {
            table
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect()
        }
        Self {
            predicates: lower(self.predicates),
            functions: lower(self.functions),
            operators: lower(self.operators),
            preconditions: lower(self.preconditions),
        }
    }

    pub fn is_predicate(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn predicate_params(&self, name: &str) -> Option<&[String]> {
        self.predicates.get(name).map(Vec::as_slice)
    }

    pub fn function_params(&self, name: &str) -> Option<&[String]> {
        self.functions.get(name).map(Vec::as_slice)
    }

    /// Parameter labels of a predicate, falling back to a function of that name
    pub fn attribute_params(&self, name: &str) -> PlanResult<&[String]> {
        self.predicate_params(name)
            .or_else(|| self.function_params(name))
            .ok_or_else(|| PlanError::DomainLookup {
                kind: LookupKind::Predicate,
                name: name.to_string(),
                known: sorted_keys(self.predicates.keys().chain(self.functions.keys())),
            })
    }

    pub fn operator_params(&self, name: &str) -> PlanResult<&[String]> {
        self.operators
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| PlanError::DomainLookup {
                kind: LookupKind::Operator,
                name: name.to_string(),
                known: sorted_keys(self.operators.keys()),
            })
    }

    pub fn preconditions(&self, operator: &str) -> PlanResult<&[ConditionTuple]> {
        self.preconditions
            .get(&operator.to_lowercase())
            .map(Vec::as_slice)
            .ok_or_else(|| PlanError::DomainLookup {
                kind: LookupKind::PreconditionEntry,
                name: operator.to_string(),
                known: sorted_keys(self.preconditions.keys()),
            })
    }
}

fn collect_labels<I, S>(params: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    params.into_iter().map(Into::into).collect()
}

fn sorted_keys<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut names: Vec<String> = keys.cloned().collect();
    names.sort();
    names.dedup();
    names
}
