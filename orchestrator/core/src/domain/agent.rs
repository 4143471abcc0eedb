// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Agent contract.
//!
//! Every pipeline unit implements [`Agent`]: it declares the input keys it
//! needs, accepts a structured input bundle, and asynchronously produces an
//! [`AgentResult`]. The orchestrator holds agents behind `Arc<dyn Agent>` and
//! never interprets payload contents beyond key routing.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open-ended string-keyed bundle used for both agent inputs and outputs.
pub type Payload = serde_json::Map<String, Value>;

// ============================================================================
// Value Objects
// ============================================================================

/// Stable identifier for a registered agent (and for the task bound to it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an agent.
///
/// Informational only: the scheduler gates on the returned [`AgentResult`],
/// never on this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Processing,
    Completed,
    Error,
}

/// Outcome of one agent invocation. Immutable after construction; owned by
/// the orchestrator's result store once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Payload>,
}

impl AgentResult {
    /// Successful result carrying an output payload.
    pub fn ok(data: Payload) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: None,
        }
    }

    /// Successful result with diagnostic metadata attached.
    pub fn ok_with_metadata(data: Payload, metadata: Payload) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: Some(metadata),
        }
    }

    /// Failed result. By convention `error` is always present when
    /// `success` is false.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata: None,
        }
    }
}

// ============================================================================
// Agent Identity & Status Cell
// ============================================================================

/// Shared identity and status cell embedded by every concrete agent.
///
/// Replaces the abstract-base-class pattern: concrete agents hold an
/// `AgentState` and hand it out through [`Agent::state`], which powers the
/// provided accessors on the trait. The status lives behind a lock because
/// agents are shared (`Arc<dyn Agent>`) while the orchestrator and the agent
/// itself both write it.
#[derive(Debug)]
pub struct AgentState {
    id: AgentId,
    name: String,
    description: String,
    status: RwLock<AgentStatus>,
}

impl AgentState {
    pub fn new(
        id: impl Into<AgentId>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            status: RwLock::new(AgentStatus::Idle),
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> AgentStatus {
        *self.status.read()
    }

    pub fn set_status(&self, status: AgentStatus) {
        *self.status.write() = status;
    }
}

// ============================================================================
// Agent Capability Trait
// ============================================================================

/// Capability interface for a pipeline unit.
///
/// # Contract
///
/// - [`required_inputs`](Agent::required_inputs) is pure and side-effect free.
/// - [`process`](Agent::process) validates its input against the declared
///   keys before doing other work and returns a failure result (not a panic,
///   not an `Err`) for missing inputs. Any other internal failure is likewise
///   converted to a failure result so the scheduler's control flow stays
///   uniform.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Identity and status cell backing the provided accessors.
    fn state(&self) -> &AgentState;

    /// Input keys that must be present for the agent to proceed.
    fn required_inputs(&self) -> &[&str];

    /// Sole processing entry point.
    async fn process(&self, input: Payload) -> AgentResult;

    fn id(&self) -> &AgentId {
        self.state().id()
    }

    fn name(&self) -> &str {
        self.state().name()
    }

    fn description(&self) -> &str {
        self.state().description()
    }

    fn status(&self) -> AgentStatus {
        self.state().status()
    }

    fn set_status(&self, status: AgentStatus) {
        self.state().set_status(status);
    }

    /// Check `input` against [`required_inputs`](Agent::required_inputs),
    /// returning a message listing every missing key.
    fn validate_input(&self, input: &Payload) -> Result<(), String> {
        let missing: Vec<&str> = self
            .required_inputs()
            .iter()
            .copied()
            .filter(|key| !input.contains_key(*key))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required inputs: {}", missing.join(", ")))
        }
    }
}
