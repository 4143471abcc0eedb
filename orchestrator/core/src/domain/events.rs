// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Execution log entries and pipeline domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::agent::{AgentId, AgentResult, Payload};
use crate::domain::workflow::WorkflowStatus;

/// What a log entry records about a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    /// Task is about to be invoked, with the input bundle routed to it.
    Started { input: Payload },
    /// Task invocation returned.
    Completed { result: AgentResult },
}

/// One entry of the append-only, single-writer execution log.
///
/// Timestamps come from the injected [`Clock`](crate::infrastructure::clock::Clock)
/// so they are deterministic under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub task_id: AgentId,
    #[serde(flatten)]
    pub event: LogEvent,
    pub timestamp: DateTime<Utc>,
}

/// Events published to the in-memory event bus while a run progresses.
///
/// Purely informational: subscribers observe execution, they never drive it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted {
        run_id: Uuid,
    },
    TaskStarted {
        run_id: Uuid,
        task_id: AgentId,
    },
    TaskCompleted {
        run_id: Uuid,
        task_id: AgentId,
        success: bool,
    },
    RunFinished {
        run_id: Uuid,
        status: WorkflowStatus,
    },
}
