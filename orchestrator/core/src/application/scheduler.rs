// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Topological execution ordering (Kahn's algorithm).
//!
//! Tasks with no unmet dependencies are eligible immediately; eligibility is
//! consumed in FIFO order, seeded by declaration order, so the result is
//! stable rather than an arbitrary re-sort. The seed pseudo-dependency never
//! counts toward in-degree.

use std::collections::{HashMap, VecDeque};

use crate::domain::agent::AgentId;
use crate::domain::workflow::{TaskSpec, WorkflowError, SEED_INPUT_ID};

/// Compute the execution order for the declared task set.
///
/// Returns `Err(CircularDependency)` when the ordered count falls short of
/// the task count, a cycle the validator should already have rejected, so
/// callers treat this as a fatal internal fault.
pub fn topological_order(tasks: &[TaskSpec]) -> Result<Vec<AgentId>, WorkflowError> {
    let mut in_degree: HashMap<&AgentId, usize> = HashMap::new();
    let mut dependents: HashMap<&AgentId, Vec<&AgentId>> = HashMap::new();

    for task in tasks {
        let real_deps = task
            .dependencies
            .iter()
            .filter(|d| d.as_str() != SEED_INPUT_ID)
            .count();
        in_degree.insert(&task.agent_id, real_deps);
        dependents.entry(&task.agent_id).or_default();
    }

    for task in tasks {
        for dependency in &task.dependencies {
            if dependency.as_str() == SEED_INPUT_ID {
                continue;
            }
            if let Some(downstream) = dependents.get_mut(dependency) {
                downstream.push(&task.agent_id);
            }
        }
    }

    // Declaration order seeds the queue, keeping ties deterministic.
    let mut queue: VecDeque<&AgentId> = tasks
        .iter()
        .map(|task| &task.agent_id)
        .filter(|id| in_degree[*id] == 0)
        .collect();

    let mut order = Vec::with_capacity(tasks.len());

    while let Some(id) = queue.pop_front() {
        order.push(id.clone());

        for &dependent in &dependents[id] {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }
    }

    if order.len() != tasks.len() {
        let stuck = tasks
            .iter()
            .map(|task| &task.agent_id)
            .find(|id| !order.contains(id))
            .cloned()
            .unwrap_or_else(|| AgentId::from("unknown"));
        return Err(WorkflowError::CircularDependency(stuck));
    }

    Ok(order)
}
