// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Costwise orchestration core.
//!
//! Coordinates independent analysis agents over a declared dependency graph:
//! registration, topological scheduling, data routing between tasks, and
//! fail-fast failure semantics. Agent internals (cloud ingestion, inefficiency
//! heuristics, cost arithmetic) live outside this crate and are reached only
//! through the [`domain::agent::Agent`] trait.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::orchestrator::Orchestrator;
pub use domain::agent::{Agent, AgentId, AgentResult, AgentState, AgentStatus, Payload};
pub use domain::workflow::{RunReport, TaskSpec, WorkflowError, WorkflowStatus, SEED_INPUT_ID};
