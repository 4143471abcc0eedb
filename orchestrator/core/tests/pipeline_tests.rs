// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the orchestration pipeline: graph validation,
//! topological execution, input routing, fail-fast halting, reset, the
//! execution log, and manifest-driven declaration.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use costwise_core::domain::events::{LogEvent, PipelineEvent};
use costwise_core::infrastructure::clock::StepClock;
use costwise_core::infrastructure::manifest::PipelineManifest;
use costwise_core::{
    Agent, AgentId, AgentResult, AgentState, AgentStatus, Orchestrator, Payload, WorkflowError,
    WorkflowStatus, SEED_INPUT_ID,
};

// ============================================================================
// Scripted Test Agent
// ============================================================================

type Script = Box<dyn Fn(&Payload) -> AgentResult + Send + Sync>;

/// Test double driven by a closure; records every input bundle it receives.
struct ScriptedAgent {
    state: AgentState,
    required: Vec<&'static str>,
    script: Script,
    seen: Mutex<Vec<Payload>>,
}

impl ScriptedAgent {
    fn new(
        id: &str,
        required: Vec<&'static str>,
        script: impl Fn(&Payload) -> AgentResult + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: AgentState::new(id, id, "scripted test agent"),
            required,
            script: Box::new(script),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn emitting(id: &str, key: &'static str, value: serde_json::Value) -> Arc<Self> {
        Self::new(id, vec![], move |_| {
            let mut data = Payload::new();
            data.insert(key.to_string(), value.clone());
            AgentResult::ok(data)
        })
    }

    fn invocations(&self) -> usize {
        self.seen.lock().len()
    }

    fn last_input(&self) -> Payload {
        self.seen.lock().last().cloned().expect("agent never ran")
    }
}

#[async_trait::async_trait]
impl Agent for ScriptedAgent {
    fn state(&self) -> &AgentState {
        &self.state
    }

    fn required_inputs(&self) -> &[&str] {
        &self.required
    }

    async fn process(&self, input: Payload) -> AgentResult {
        if let Err(error) = self.validate_input(&input) {
            return AgentResult::fail(error);
        }
        self.seen.lock().push(input.clone());
        (self.script)(&input)
    }
}

fn id(s: &str) -> AgentId {
    AgentId::from(s)
}

fn seed(pairs: &[(&str, serde_json::Value)]) -> Payload {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn dangling_dependency_fails_before_anything_runs() {
    let a = ScriptedAgent::emitting("a", "y", json!(1));
    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a.clone()).unwrap();
    orchestrator
        .add_task("a", vec![id("ghost")], HashMap::new())
        .unwrap();

    let error = orchestrator.execute(None).await.unwrap_err();
    assert!(matches!(error, WorkflowError::UnknownDependency { .. }));
    assert_eq!(orchestrator.status(), WorkflowStatus::Failed);
    assert_eq!(a.invocations(), 0);
    assert_eq!(a.status(), AgentStatus::Idle);
}

#[tokio::test]
async fn cyclic_workflow_executes_zero_tasks() {
    let a = ScriptedAgent::emitting("a", "x", json!(1));
    let b = ScriptedAgent::emitting("b", "y", json!(2));
    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a.clone()).unwrap();
    orchestrator.register_agent(b.clone()).unwrap();
    orchestrator
        .add_task("a", vec![id("b")], HashMap::new())
        .unwrap();
    orchestrator
        .add_task("b", vec![id("a")], HashMap::new())
        .unwrap();

    let error = orchestrator.execute(None).await.unwrap_err();
    assert!(matches!(error, WorkflowError::CircularDependency(_)));
    assert_eq!(a.invocations() + b.invocations(), 0);
    assert!(orchestrator.results().is_empty());
    assert!(orchestrator.log().is_empty());
}

// ============================================================================
// Ordering & Routing
// ============================================================================

#[tokio::test]
async fn tasks_run_strictly_after_their_dependencies() {
    let order = Arc::new(Mutex::new(Vec::<String>::new()));

    let tracker = |name: &'static str, order: Arc<Mutex<Vec<String>>>| {
        ScriptedAgent::new(name, vec![], move |_| {
            order.lock().push(name.to_string());
            AgentResult::ok(Payload::new())
        })
    };

    let mut orchestrator = Orchestrator::new();
    // Declared back to front on purpose.
    orchestrator
        .register_agent(tracker("c", order.clone()))
        .unwrap();
    orchestrator
        .register_agent(tracker("b", order.clone()))
        .unwrap();
    orchestrator
        .register_agent(tracker("a", order.clone()))
        .unwrap();
    orchestrator
        .add_task("c", vec![id("a"), id("b")], HashMap::new())
        .unwrap();
    orchestrator
        .add_task("b", vec![id("a")], HashMap::new())
        .unwrap();
    orchestrator.add_task("a", vec![], HashMap::new()).unwrap();

    let report = orchestrator.execute(None).await.unwrap();
    assert!(report.is_completed());
    assert_eq!(*order.lock(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn passthrough_and_merge_routing() {
    // A consumes the seed, emits {"y": 2}. B (no mapping) must see {"y": 2}
    // and emits {"z": 3}. C must see the merge {"y": 2, "z": 3}.
    let a = ScriptedAgent::new("a", vec!["x"], |_| {
        let mut data = Payload::new();
        data.insert("y".into(), json!(2));
        AgentResult::ok(data)
    });
    let b = ScriptedAgent::new("b", vec!["y"], |_| {
        let mut data = Payload::new();
        data.insert("z".into(), json!(3));
        AgentResult::ok(data)
    });
    let c = ScriptedAgent::new("c", vec![], |_| AgentResult::ok(Payload::new()));

    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a.clone()).unwrap();
    orchestrator.register_agent(b.clone()).unwrap();
    orchestrator.register_agent(c.clone()).unwrap();
    orchestrator
        .add_task("a", vec![id(SEED_INPUT_ID)], HashMap::new())
        .unwrap();
    orchestrator
        .add_task("b", vec![id("a")], HashMap::new())
        .unwrap();
    orchestrator
        .add_task("c", vec![id("a"), id("b")], HashMap::new())
        .unwrap();

    let report = orchestrator
        .execute(Some(seed(&[("x", json!(1))])))
        .await
        .unwrap();

    assert!(report.is_completed());
    assert_eq!(a.last_input().get("x"), Some(&json!(1)));
    assert_eq!(b.last_input(), seed(&[("y", json!(2))]));
    assert_eq!(c.last_input(), seed(&[("y", json!(2)), ("z", json!(3))]));
}

#[tokio::test]
async fn explicit_mapping_renames_upstream_keys() {
    let a = ScriptedAgent::emitting("a", "y", json!(2));
    let b = ScriptedAgent::new("b", vec![], |_| AgentResult::ok(Payload::new()));

    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a).unwrap();
    orchestrator.register_agent(b.clone()).unwrap();
    orchestrator.add_task("a", vec![], HashMap::new()).unwrap();
    orchestrator
        .add_task(
            "b",
            vec![id("a")],
            HashMap::from([("y".to_string(), "renamed".to_string())]),
        )
        .unwrap();

    orchestrator.execute(None).await.unwrap();

    let input = b.last_input();
    assert_eq!(input.get("renamed"), Some(&json!(2)));
    assert!(!input.contains_key("y"));
}

// ============================================================================
// Failure Semantics
// ============================================================================

#[tokio::test]
async fn first_failure_halts_the_run() {
    let a = ScriptedAgent::new("a", vec![], |_| AgentResult::fail("boom"));
    let b = ScriptedAgent::emitting("b", "z", json!(3));
    let c = ScriptedAgent::emitting("c", "w", json!(4));

    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a.clone()).unwrap();
    orchestrator.register_agent(b.clone()).unwrap();
    orchestrator.register_agent(c.clone()).unwrap();
    orchestrator.add_task("a", vec![], HashMap::new()).unwrap();
    orchestrator
        .add_task("b", vec![id("a")], HashMap::new())
        .unwrap();
    orchestrator
        .add_task("c", vec![id("a"), id("b")], HashMap::new())
        .unwrap();

    let report = orchestrator.execute(None).await.unwrap();

    assert_eq!(report.status, WorkflowStatus::Failed);
    assert_eq!(report.failed_task, Some(id("a")));
    assert_eq!(report.error.as_deref(), Some("boom"));
    assert!(report.results.contains_key(&id("a")));

    // Downstream tasks never reach process; their agents stay idle.
    assert_eq!(b.invocations(), 0);
    assert_eq!(c.invocations(), 0);
    assert_eq!(b.status(), AgentStatus::Idle);
    assert_eq!(c.status(), AgentStatus::Idle);
    assert_eq!(a.status(), AgentStatus::Error);
}

#[tokio::test]
async fn upstream_successes_survive_a_downstream_failure() {
    let a = ScriptedAgent::emitting("a", "y", json!(2));
    let b = ScriptedAgent::new("b", vec![], |_| AgentResult::fail("late failure"));

    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a).unwrap();
    orchestrator.register_agent(b).unwrap();
    orchestrator.add_task("a", vec![], HashMap::new()).unwrap();
    orchestrator
        .add_task("b", vec![id("a")], HashMap::new())
        .unwrap();

    let report = orchestrator.execute(None).await.unwrap();

    assert_eq!(report.failed_task, Some(id("b")));
    let upstream = &report.results[&id("a")];
    assert!(upstream.success);
    assert_eq!(upstream.data.as_ref().unwrap().get("y"), Some(&json!(2)));
}

#[tokio::test]
async fn missing_seed_surfaces_as_internal_fault_not_panic() {
    // Task declares the seed pseudo-dependency but no seed was supplied:
    // the router's lookup fails and the run converts it into a failed report.
    let a = ScriptedAgent::emitting("a", "y", json!(1));
    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a.clone()).unwrap();
    orchestrator
        .add_task("a", vec![id(SEED_INPUT_ID)], HashMap::new())
        .unwrap();

    let report = orchestrator.execute(None).await.unwrap();

    assert_eq!(report.status, WorkflowStatus::Failed);
    assert!(report.failed_task.is_none());
    assert!(report.error.unwrap().contains(SEED_INPUT_ID));
    assert_eq!(a.invocations(), 0);
}

#[tokio::test]
async fn missing_required_input_fails_the_task_uniformly() {
    let a = ScriptedAgent::new("a", vec!["needed"], |_| AgentResult::ok(Payload::new()));
    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a.clone()).unwrap();
    orchestrator.add_task("a", vec![], HashMap::new()).unwrap();

    let report = orchestrator.execute(None).await.unwrap();

    assert_eq!(report.status, WorkflowStatus::Failed);
    assert_eq!(report.failed_task, Some(id("a")));
    assert!(report.error.unwrap().contains("needed"));
    assert_eq!(a.status(), AgentStatus::Error);
}

// ============================================================================
// Log, Events, Reset
// ============================================================================

#[tokio::test]
async fn log_records_start_and_completion_with_deterministic_timestamps() {
    let a = ScriptedAgent::emitting("a", "y", json!(1));
    let b = ScriptedAgent::emitting("b", "z", json!(2));

    let mut orchestrator = Orchestrator::with_clock(Arc::new(StepClock::epoch_seconds()));
    orchestrator.register_agent(a).unwrap();
    orchestrator.register_agent(b).unwrap();
    orchestrator.add_task("a", vec![], HashMap::new()).unwrap();
    orchestrator
        .add_task("b", vec![id("a")], HashMap::new())
        .unwrap();

    let report = orchestrator.execute(None).await.unwrap();

    assert_eq!(report.log.len(), 4);
    let kinds: Vec<(&str, bool)> = report
        .log
        .iter()
        .map(|entry| {
            (
                entry.task_id.as_str(),
                matches!(entry.event, LogEvent::Started { .. }),
            )
        })
        .collect();
    assert_eq!(
        kinds,
        vec![("a", true), ("a", false), ("b", true), ("b", false)]
    );

    for pair in report.log.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
    assert_eq!(report.log[0].timestamp.timestamp(), 0);
}

#[tokio::test]
async fn subscribers_observe_the_run_in_order() {
    let a = ScriptedAgent::emitting("a", "y", json!(1));
    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a).unwrap();
    orchestrator.add_task("a", vec![], HashMap::new()).unwrap();

    let mut events = orchestrator.subscribe();
    let report = orchestrator.execute(None).await.unwrap();

    assert!(matches!(
        events.try_recv().unwrap(),
        PipelineEvent::RunStarted { run_id } if run_id == report.run_id
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        PipelineEvent::TaskStarted { .. }
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        PipelineEvent::TaskCompleted { success: true, .. }
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        PipelineEvent::RunFinished {
            status: WorkflowStatus::Completed,
            ..
        }
    ));
}

#[tokio::test]
async fn reset_clears_run_state_but_keeps_declarations() {
    let a = ScriptedAgent::emitting("a", "y", json!(1));
    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a.clone()).unwrap();
    orchestrator.add_task("a", vec![], HashMap::new()).unwrap();

    let first = orchestrator.execute(None).await.unwrap();
    assert!(first.is_completed());
    assert_eq!(a.status(), AgentStatus::Completed);

    orchestrator.reset();

    assert_eq!(orchestrator.status(), WorkflowStatus::Pending);
    assert!(orchestrator.results().is_empty());
    assert!(orchestrator.log().is_empty());
    assert_eq!(a.status(), AgentStatus::Idle);
    assert_eq!(orchestrator.tasks().len(), 1);

    // Declarations survive: the workflow runs again untouched.
    let second = orchestrator.execute(None).await.unwrap();
    assert!(second.is_completed());
    assert_eq!(a.invocations(), 2);
}

// ============================================================================
// Manifest-driven Declaration
// ============================================================================

#[tokio::test]
async fn manifest_tasks_behave_like_programmatic_ones() {
    let yaml = r#"
apiVersion: costwise.io/v1
kind: Pipeline
metadata:
  name: two-step
spec:
  tasks:
    - agent: a
    - agent: b
      dependsOn: [a]
      inputMapping:
        y: renamed
"#;
    let manifest = PipelineManifest::parse_yaml(yaml).unwrap();

    let a = ScriptedAgent::emitting("a", "y", json!(7));
    let b = ScriptedAgent::new("b", vec!["renamed"], |input| {
        AgentResult::ok(input.clone())
    });

    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(a).unwrap();
    orchestrator.register_agent(b.clone()).unwrap();
    orchestrator.load_manifest(&manifest).unwrap();

    let report = orchestrator.execute(None).await.unwrap();

    assert!(report.is_completed());
    assert_eq!(b.last_input().get("renamed"), Some(&json!(7)));
}

#[tokio::test]
async fn manifest_naming_an_unregistered_agent_is_rejected() {
    let yaml = r#"
apiVersion: costwise.io/v1
kind: Pipeline
metadata:
  name: broken
spec:
  tasks:
    - agent: nobody
"#;
    let manifest = PipelineManifest::parse_yaml(yaml).unwrap();
    let mut orchestrator = Orchestrator::new();

    assert!(matches!(
        orchestrator.load_manifest(&manifest),
        Err(WorkflowError::AgentNotRegistered(_))
    ));
}
