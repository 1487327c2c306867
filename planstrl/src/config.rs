//! Configuration for plan translation
//!
//! Mirrors the parameters the planning system passes around: where the
//! planner drops its trace, where the Esterel controller goes, and the first
//! free action id.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::graph::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanstrlConfig {
    /// Directory holding the planner output
    pub data_path: PathBuf,
    /// Trace file name inside `data_path`
    pub plan_file: String,
    /// Output path of the emitted Esterel program
    pub strl_file_path: PathBuf,
    pub free_action_id: NodeId,
    /// Optional JSON export of dispatch records and conditions
    pub export_path: Option<PathBuf>,
}

impl Default for PlanstrlConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("common/"),
            plan_file: "plan.pddl".to_string(),
            strl_file_path: PathBuf::from("common/plan.strl"),
            free_action_id: 0,
            export_path: None,
        }
    }
}

impl PlanstrlConfig {
    pub fn plan_path(&self) -> PathBuf {
        self.data_path.join(&self.plan_file)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::io(path, e))?;
        toml::from_str(&content).map_err(|e| PlanError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> PlanResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| PlanError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| PlanError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlanstrlConfig::default();
        assert_eq!(config.plan_path(), PathBuf::from("common/plan.pddl"));
        assert_eq!(config.strl_file_path, PathBuf::from("common/plan.strl"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planstrl.toml");
        std::fs::write(&path, "free_action_id = 12\ndata_path = \"/tmp/plans\"\n").unwrap();

        let config = PlanstrlConfig::load_from_file(&path).unwrap();
        assert_eq!(config.free_action_id, 12);
        assert_eq!(config.plan_path(), PathBuf::from("/tmp/plans/plan.pddl"));
        assert_eq!(config.plan_file, "plan.pddl");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planstrl.toml");
        let config = PlanstrlConfig {
            export_path: Some(PathBuf::from("out/plan.json")),
            ..PlanstrlConfig::default()
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(PlanstrlConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planstrl.toml");
        std::fs::write(&path, "free_action_id = \"twelve\"").unwrap();
        assert!(matches!(
            PlanstrlConfig::load_from_file(&path),
            Err(PlanError::Config { .. })
        ));
    }
}
