// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Dependency graph validation.
//!
//! Confirms well-formedness of the declared task set before any execution
//! begins: every dependency names a task in the same workflow (the seed
//! pseudo-identifier is always considered present) and no task transitively
//! depends on itself. Validation is synchronous and idempotent; a workflow
//! that fails it executes nothing.
//!
//! This DFS is the canonical cycle-detection point. The scheduler's
//! leftover-node count exists only as a fatal internal assertion.

use std::collections::{HashMap, HashSet};

use crate::domain::agent::AgentId;
use crate::domain::workflow::{TaskSpec, WorkflowError, SEED_INPUT_ID};

/// Validate the full task set, failing on the first dangling reference or
/// cycle found.
pub fn validate(tasks: &[TaskSpec]) -> Result<(), WorkflowError> {
    let by_id: HashMap<&AgentId, &TaskSpec> =
        tasks.iter().map(|task| (&task.agent_id, task)).collect();

    for task in tasks {
        for dependency in &task.dependencies {
            if dependency.as_str() == SEED_INPUT_ID {
                continue;
            }
            if !by_id.contains_key(dependency) {
                return Err(WorkflowError::UnknownDependency {
                    task: task.agent_id.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    let mut visited = HashSet::new();
    for task in tasks {
        let mut path = HashSet::new();
        if has_cycle(&task.agent_id, &by_id, &mut visited, &mut path) {
            return Err(WorkflowError::CircularDependency(task.agent_id.clone()));
        }
    }

    Ok(())
}

/// Depth-first search over dependency edges with an explicit recursion path.
fn has_cycle(
    current: &AgentId,
    by_id: &HashMap<&AgentId, &TaskSpec>,
    visited: &mut HashSet<AgentId>,
    path: &mut HashSet<AgentId>,
) -> bool {
    if path.contains(current) {
        return true;
    }
    if visited.contains(current) {
        return false;
    }

    visited.insert(current.clone());
    path.insert(current.clone());

    if let Some(task) = by_id.get(current) {
        for dependency in &task.dependencies {
            if dependency.as_str() == SEED_INPUT_ID {
                continue;
            }
            if has_cycle(dependency, by_id, visited, path) {
                return true;
            }
        }
    }

    path.remove(current);
    false
}
