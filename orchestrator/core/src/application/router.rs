// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Input routing.
//!
//! Builds the input bundle for one task from the recorded results of its
//! dependencies, applying either the task's explicit key mapping or a full
//! passthrough merge. The bundle is a fresh map with cloned values so one
//! task can never observe another's mutations.

use std::collections::HashMap;

use crate::domain::agent::{AgentId, AgentResult, Payload};
use crate::domain::workflow::{TaskSpec, WorkflowError};

/// Build the input bundle for `task`.
///
/// Dependencies are consumed in declaration order. Each one must already have
/// a recorded, successful result; a violation is a fatal construction error,
/// not a soft task failure. The executor's fail-fast ordering should make the
/// failed-dependency arm unreachable, but the re-check keeps the router safe
/// when driven standalone.
pub fn build_input(
    task: &TaskSpec,
    results: &HashMap<AgentId, AgentResult>,
) -> Result<Payload, WorkflowError> {
    let mut input = Payload::new();

    for dependency in &task.dependencies {
        let result = results
            .get(dependency)
            .ok_or_else(|| WorkflowError::MissingDependencyResult(dependency.clone()))?;

        if !result.success {
            return Err(WorkflowError::DependencyFailed {
                dependency: dependency.clone(),
                error: result
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let Some(data) = &result.data else {
            continue;
        };

        if task.input_mapping.is_empty() {
            // Passthrough: later dependencies overwrite same-named keys.
            for (key, value) in data {
                input.insert(key.clone(), value.clone());
            }
        } else {
            for (output_key, input_key) in &task.input_mapping {
                if let Some(value) = data.get(output_key) {
                    input.insert(input_key.clone(), value.clone());
                }
            }
        }
    }

    Ok(input)
}
