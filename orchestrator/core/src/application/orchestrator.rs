// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Orchestrator application service.
//!
//! The facade over the orchestration core: registers agents, declares tasks,
//! validates the dependency graph, executes tasks strictly in topological
//! order with fail-fast semantics, and owns the per-run result store and
//! execution log.
//!
//! # Execution Loop
//!
//! ```text
//! validate graph            (configuration errors -> Err, nothing runs)
//! for task in topological order {
//!     input  = route dependency outputs (+ seed)
//!     status = Processing
//!     result = agent.process(input).await
//!     status = Completed | Error
//!     record result, log Started/Completed
//!     if !result.success { halt; report partial results }
//! }
//! ```
//!
//! Tasks run one at a time even when the graph would permit parallelism;
//! suspension inside one `process` call never interleaves with another task.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::{router, scheduler, validation};
use crate::domain::agent::{Agent, AgentId, AgentResult, AgentStatus, Payload};
use crate::domain::events::{LogEntry, LogEvent, PipelineEvent};
use crate::domain::workflow::{RunReport, TaskSpec, WorkflowError, WorkflowStatus, SEED_INPUT_ID};
use crate::infrastructure::clock::{Clock, SystemClock};
use crate::infrastructure::event_bus::{EventBus, EventReceiver};
use crate::infrastructure::manifest::PipelineManifest;

pub struct Orchestrator {
    /// Registered agents, held by reference; the orchestrator never copies
    /// agent state.
    agents: HashMap<AgentId, Arc<dyn Agent>>,
    /// Declared tasks in declaration order.
    tasks: Vec<TaskSpec>,
    status: WorkflowStatus,
    /// Per-run result store, keyed by task identifier (plus the seed
    /// pseudo-identifier).
    results: HashMap<AgentId, AgentResult>,
    /// Append-only execution log, single writer.
    log: Vec<LogEntry>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Construct with an injected clock; tests use a deterministic one.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            agents: HashMap::new(),
            tasks: Vec::new(),
            status: WorkflowStatus::Pending,
            results: HashMap::new(),
            log: Vec::new(),
            clock,
            event_bus: EventBus::with_default_capacity(),
        }
    }

    // ========================================================================
    // Registration & Task Declaration
    // ========================================================================

    /// Register an agent under its own identifier.
    ///
    /// Registering a second agent with the same identifier is rejected rather
    /// than silently overwriting.
    pub fn register_agent(&mut self, agent: Arc<dyn Agent>) -> Result<(), WorkflowError> {
        let id = agent.id().clone();
        if self.agents.contains_key(&id) {
            return Err(WorkflowError::DuplicateAgent(id));
        }
        debug!(agent = %id, name = agent.name(), "registering agent");
        self.agents.insert(id, agent);
        Ok(())
    }

    /// Declare a task for a registered agent.
    ///
    /// Re-adding an identifier already bound to a task is rejected; the task
    /// list never shadows.
    pub fn add_task(
        &mut self,
        agent_id: impl Into<AgentId>,
        dependencies: Vec<AgentId>,
        input_mapping: HashMap<String, String>,
    ) -> Result<(), WorkflowError> {
        self.add_task_spec(TaskSpec::new(agent_id, dependencies, input_mapping))
    }

    pub fn add_task_spec(&mut self, task: TaskSpec) -> Result<(), WorkflowError> {
        if !self.agents.contains_key(&task.agent_id) {
            return Err(WorkflowError::AgentNotRegistered(task.agent_id));
        }
        if self.tasks.iter().any(|t| t.agent_id == task.agent_id) {
            return Err(WorkflowError::DuplicateTask(task.agent_id));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Declare every task of a parsed manifest, in manifest order.
    pub fn load_manifest(&mut self, manifest: &PipelineManifest) -> Result<(), WorkflowError> {
        for task in manifest.task_specs() {
            self.add_task_spec(task)?;
        }
        Ok(())
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute the declared workflow.
    ///
    /// Configuration errors (dangling references, cycles) return `Err` and
    /// nothing runs. Task failures and unexpected internal faults return
    /// `Ok` with a `Failed` report carrying whatever results were recorded.
    pub async fn execute(&mut self, seed: Option<Payload>) -> Result<RunReport, WorkflowError> {
        if let Err(error) = validation::validate(&self.tasks) {
            self.status = WorkflowStatus::Failed;
            return Err(error);
        }

        let run_id = Uuid::new_v4();
        self.status = WorkflowStatus::Running;
        self.results.clear();
        self.log.clear();

        if let Some(seed) = seed {
            self.results
                .insert(AgentId::from(SEED_INPUT_ID), AgentResult::ok(seed));
        }

        info!(%run_id, tasks = self.tasks.len(), "executing pipeline");
        self.event_bus.publish(PipelineEvent::RunStarted { run_id });

        let report = match self.run_tasks(run_id).await {
            Ok(None) => {
                self.status = WorkflowStatus::Completed;
                info!(%run_id, "pipeline completed");
                self.report(run_id, None, None)
            }
            Ok(Some(failed_task)) => {
                self.status = WorkflowStatus::Failed;
                let error = self
                    .results
                    .get(&failed_task)
                    .and_then(|r| r.error.clone());
                warn!(%run_id, task = %failed_task, "pipeline halted on task failure");
                self.report(run_id, Some(failed_task), error)
            }
            Err(fault) => {
                // Anything the scheduler or router raises unexpectedly is
                // converted into a failed run, keeping partial results.
                self.status = WorkflowStatus::Failed;
                warn!(%run_id, %fault, "pipeline aborted by internal fault");
                self.report(run_id, None, Some(fault.to_string()))
            }
        };

        self.event_bus.publish(PipelineEvent::RunFinished {
            run_id,
            status: self.status,
        });
        Ok(report)
    }

    /// Run tasks in resolved order. Returns the failing task's identifier on
    /// a fail-fast halt, `None` when every task succeeded.
    async fn run_tasks(&mut self, run_id: Uuid) -> Result<Option<AgentId>, WorkflowError> {
        let order = scheduler::topological_order(&self.tasks)?;

        for task_id in order {
            let task = self
                .tasks
                .iter()
                .find(|t| t.agent_id == task_id)
                .cloned()
                .ok_or_else(|| WorkflowError::AgentNotRegistered(task_id.clone()))?;

            let agent = self
                .agents
                .get(&task.agent_id)
                .cloned()
                .ok_or_else(|| WorkflowError::AgentNotRegistered(task.agent_id.clone()))?;

            let input = router::build_input(&task, &self.results)?;

            debug!(task = %task_id, keys = input.len(), "starting task");
            self.log.push(LogEntry {
                task_id: task_id.clone(),
                event: LogEvent::Started {
                    input: input.clone(),
                },
                timestamp: self.clock.now(),
            });
            self.event_bus.publish(PipelineEvent::TaskStarted {
                run_id,
                task_id: task_id.clone(),
            });

            agent.set_status(AgentStatus::Processing);
            let result = agent.process(input).await;
            agent.set_status(if result.success {
                AgentStatus::Completed
            } else {
                AgentStatus::Error
            });

            self.log.push(LogEntry {
                task_id: task_id.clone(),
                event: LogEvent::Completed {
                    result: result.clone(),
                },
                timestamp: self.clock.now(),
            });
            self.event_bus.publish(PipelineEvent::TaskCompleted {
                run_id,
                task_id: task_id.clone(),
                success: result.success,
            });

            let success = result.success;
            self.results.insert(task_id.clone(), result);

            if !success {
                return Ok(Some(task_id));
            }
        }

        Ok(None)
    }

    fn report(
        &self,
        run_id: Uuid,
        failed_task: Option<AgentId>,
        error: Option<String>,
    ) -> RunReport {
        RunReport {
            run_id,
            status: self.status,
            results: self.results.clone(),
            log: self.log.clone(),
            failed_task,
            error,
        }
    }

    // ========================================================================
    // State Queries & Reset
    // ========================================================================

    /// Current workflow status; no side effects.
    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Arc<dyn Agent>> {
        self.agents.get(id)
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn results(&self) -> &HashMap<AgentId, AgentResult> {
        &self.results
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Subscribe to pipeline events for this orchestrator's runs.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }

    /// Clear all results and the log and return every registered agent to
    /// idle. Registrations and declared tasks survive for the next run.
    pub fn reset(&mut self) {
        self.status = WorkflowStatus::Pending;
        self.results.clear();
        self.log.clear();
        for agent in self.agents.values() {
            agent.set_status(AgentStatus::Idle);
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentState;

    struct NoopAgent {
        state: AgentState,
    }

    impl NoopAgent {
        fn shared(id: &str) -> Arc<dyn Agent> {
            Arc::new(Self {
                state: AgentState::new(id, id, "no-op"),
            })
        }
    }

    #[async_trait::async_trait]
    impl Agent for NoopAgent {
        fn state(&self) -> &AgentState {
            &self.state
        }

        fn required_inputs(&self) -> &[&str] {
            &[]
        }

        async fn process(&self, input: Payload) -> AgentResult {
            AgentResult::ok(input)
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.register_agent(NoopAgent::shared("a")).unwrap();

        assert!(matches!(
            orchestrator.register_agent(NoopAgent::shared("a")),
            Err(WorkflowError::DuplicateAgent(_))
        ));
    }

    #[test]
    fn task_for_unregistered_agent_is_rejected() {
        let mut orchestrator = Orchestrator::new();
        assert!(matches!(
            orchestrator.add_task("ghost", vec![], HashMap::new()),
            Err(WorkflowError::AgentNotRegistered(_))
        ));
    }

    #[test]
    fn duplicate_task_identifier_is_rejected() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.register_agent(NoopAgent::shared("a")).unwrap();
        orchestrator.add_task("a", vec![], HashMap::new()).unwrap();

        assert!(matches!(
            orchestrator.add_task("a", vec![], HashMap::new()),
            Err(WorkflowError::DuplicateTask(_))
        ));
    }

    #[test]
    fn starts_pending() {
        let orchestrator = Orchestrator::new();
        assert_eq!(orchestrator.status(), WorkflowStatus::Pending);
        assert!(orchestrator.tasks().is_empty());
    }
}
