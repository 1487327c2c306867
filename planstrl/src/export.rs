//! JSON export of what an executor and a knowledge base need from a plan

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PlanResult;
use crate::graph::{Condition, DispatchRecord, PlanGraph};
use crate::utils::write_atomically;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub edge: String,
    pub condition: Condition,
}

/// Dispatch records in id order and edge conditions in edge-name order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExport {
    pub dispatches: Vec<DispatchRecord>,
    pub conditions: Vec<ConditionEntry>,
}

impl PlanExport {
    pub fn from_graph(graph: &PlanGraph) -> Self {
        Self {
            dispatches: graph.nodes().map(|n| n.dispatch.clone()).collect(),
            conditions: graph
                .conditions()
                .map(|(edge, condition)| ConditionEntry {
                    edge: edge.to_string(),
                    condition: condition.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json_string(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> PlanResult<()> {
        let path = path.as_ref();
        info!(
            "Exporting {} dispatches and {} conditions to {}",
            self.dispatches.len(),
            self.conditions.len(),
            path.display()
        );
        write_atomically(path, self.to_json_string()?.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainModel;
    use crate::parser::CffPlanParser;

    #[test]
    fn test_export_shapes_dispatch_and_conditions() {
        let domain = DomainModel::new()
            .with_predicate("at", ["r", "l"])
            .with_operator("move", ["r", "from", "to"])
            .with_precondition("move", ["at", "r", "from"]);
        let mut parser = CffPlanParser::new();
        parser
            .prepare_plan(
                "ff: found legal plan as follows\n0: move robot1 rooma roomb\ntime spent: 0",
                &domain,
                3,
            )
            .unwrap();

        let export = PlanExport::from_graph(parser.graph());
        let json: serde_json::Value =
            serde_json::from_str(&export.to_json_string().unwrap()).unwrap();

        assert_eq!(json["dispatches"][0]["action_id"], 3);
        assert_eq!(json["dispatches"][0]["parameters"][2]["value"], "roomb");
        assert_eq!(json["conditions"][0]["edge"], "at robot1 rooma");
        assert_eq!(json["conditions"][0]["condition"]["kind"], "FACT");
    }
}
