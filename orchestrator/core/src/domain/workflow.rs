// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Workflow domain model.
//!
//! A workflow is the declared set of tasks (agent bindings plus dependency
//! edges and key mappings) together with per-run execution state. Task specs
//! are immutable once added; run state is owned exclusively by the
//! orchestrator and discarded on reset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::agent::{AgentId, AgentResult};
use crate::domain::events::LogEntry;

/// Reserved pseudo-identifier under which externally supplied seed input is
/// stored in the result store. Tasks may declare it as a dependency; it never
/// counts toward scheduling order.
pub const SEED_INPUT_ID: &str = "__seed__";

/// Overall status of one workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Paused,
}

/// One scheduled unit: binds a registered agent to the tasks that must
/// complete before it and to an optional output-key → input-key mapping.
///
/// An empty `input_mapping` means "merge all upstream output keys verbatim".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub agent_id: AgentId,
    #[serde(default)]
    pub dependencies: Vec<AgentId>,
    #[serde(default)]
    pub input_mapping: HashMap<String, String>,
}

impl TaskSpec {
    pub fn new(
        agent_id: impl Into<AgentId>,
        dependencies: Vec<AgentId>,
        input_mapping: HashMap<String, String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            dependencies,
            input_mapping,
        }
    }

    pub fn depends_on_seed(&self) -> bool {
        self.dependencies.iter().any(|d| d.as_str() == SEED_INPUT_ID)
    }
}

/// Summary of one `execute` run: terminal status, every recorded result, the
/// ordered execution log, and (on failure) the failing task and its error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: WorkflowStatus,
    pub results: HashMap<AgentId, AgentResult>,
    pub log: Vec<LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_task: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Agent '{0}' is not registered")]
    AgentNotRegistered(AgentId),

    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(AgentId),

    #[error("A task for agent '{0}' has already been added")]
    DuplicateTask(AgentId),

    #[error("Dependency '{dependency}' of task '{task}' not found in workflow")]
    UnknownDependency { task: AgentId, dependency: AgentId },

    #[error("Circular dependency detected involving '{0}'")]
    CircularDependency(AgentId),

    #[error("Dependency '{0}' has no recorded result")]
    MissingDependencyResult(AgentId),

    #[error("Dependency '{dependency}' failed: {error}")]
    DependencyFailed { dependency: AgentId, error: String },

    #[error("Invalid pipeline manifest: {0}")]
    ManifestError(String),
}
