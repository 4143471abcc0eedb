// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Pipeline YAML manifest parser.
//!
//! Translates the external YAML schema into domain [`TaskSpec`]s. Agents named
//! by a manifest must already be registered before the manifest is loaded.
//!
//! # Manifest Format
//!
//! ```yaml
//! apiVersion: costwise.io/v1
//! kind: Pipeline
//! metadata:
//!   name: cost-analysis
//! spec:
//!   tasks:
//!     - agent: architecture_reader
//!       dependsOn: [__seed__]
//!     - agent: efficiency_analyzer
//!       dependsOn: [architecture_reader]
//!       inputMapping:
//!         architecture: architecture
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::agent::AgentId;
use crate::domain::workflow::{TaskSpec, WorkflowError};

pub const API_VERSION: &str = "costwise.io/v1";
pub const KIND: &str = "Pipeline";

// ============================================================================
// YAML Schema (External Representation)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ManifestMetadata,
    pub spec: ManifestSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSpec {
    pub tasks: Vec<ManifestTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestTask {
    pub agent: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub input_mapping: HashMap<String, String>,
}

impl PipelineManifest {
    pub fn parse_yaml(yaml: &str) -> Result<Self, WorkflowError> {
        let manifest: PipelineManifest = serde_yaml::from_str(yaml)
            .map_err(|e| WorkflowError::ManifestError(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, WorkflowError> {
        let yaml = fs::read_to_string(path.as_ref()).map_err(|e| {
            WorkflowError::ManifestError(format!(
                "failed to read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::parse_yaml(&yaml)
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        if self.api_version != API_VERSION {
            return Err(WorkflowError::ManifestError(format!(
                "unsupported apiVersion '{}', expected '{API_VERSION}'",
                self.api_version
            )));
        }
        if self.kind != KIND {
            return Err(WorkflowError::ManifestError(format!(
                "unsupported kind '{}', expected '{KIND}'",
                self.kind
            )));
        }
        if self.spec.tasks.is_empty() {
            return Err(WorkflowError::ManifestError(
                "manifest declares no tasks".to_string(),
            ));
        }
        Ok(())
    }

    /// Translate into domain task specs, declaration order preserved.
    pub fn task_specs(&self) -> Vec<TaskSpec> {
        self.spec
            .tasks
            .iter()
            .map(|task| {
                TaskSpec::new(
                    AgentId::new(task.agent.as_str()),
                    task.depends_on.iter().map(|d| AgentId::new(d.as_str())).collect(),
                    task.input_mapping.clone(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MANIFEST: &str = r#"
apiVersion: costwise.io/v1
kind: Pipeline
metadata:
  name: cost-analysis
spec:
  tasks:
    - agent: reader
      dependsOn: [__seed__]
    - agent: analyzer
      dependsOn: [reader]
      inputMapping:
        architecture: architecture
"#;

    #[test]
    fn parses_a_valid_manifest() {
        let manifest = PipelineManifest::parse_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.metadata.name, "cost-analysis");

        let tasks = manifest.task_specs();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].agent_id.as_str(), "reader");
        assert!(tasks[0].depends_on_seed());
        assert_eq!(
            tasks[1].input_mapping.get("architecture"),
            Some(&"architecture".to_string())
        );
    }

    #[test]
    fn rejects_wrong_api_version() {
        let yaml = MANIFEST.replace("costwise.io/v1", "costwise.io/v2");
        let err = PipelineManifest::parse_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("apiVersion"));
    }

    #[test]
    fn rejects_empty_task_list() {
        let yaml = r#"
apiVersion: costwise.io/v1
kind: Pipeline
metadata:
  name: empty
spec:
  tasks: []
"#;
        let err = PipelineManifest::parse_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("no tasks"));
    }

    #[test]
    fn parses_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();

        let manifest = PipelineManifest::parse_file(file.path()).unwrap();
        assert_eq!(manifest.spec.tasks.len(), 2);
    }
}
