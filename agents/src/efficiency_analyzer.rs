// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Efficiency analyzer agent.
//!
//! Scans a structured architecture document for inefficiencies: underutilized
//! or over-provisioned compute, empty or cold storage, idle load balancers,
//! and missing IAM configuration. Findings are prioritized by severity and
//! rolled up into savings estimates and consolidated recommendations.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

use costwise_core::{Agent, AgentResult, AgentState, AgentStatus, Payload};

use crate::cost;

const UNDERUTILIZED_CPU_PCT: f64 = 20.0;
const UNDERUTILIZED_MEM_PCT: f64 = 20.0;
const OVERPROVISIONED_CPU_PCT: f64 = 30.0;
const COLD_STORAGE_DAYS: f64 = 90.0;

/// Finding severity, highest first so the derived ordering prioritizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// One inefficiency finding.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: String,
    pub resource_id: String,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
    pub potential_savings: f64,
    pub category: String,
}

pub struct EfficiencyAnalyzerAgent {
    state: AgentState,
}

impl EfficiencyAnalyzerAgent {
    pub fn new() -> Self {
        Self {
            state: AgentState::new(
                "efficiency_analyzer",
                "Efficiency Analyzer",
                "Identifies inefficiencies and optimization opportunities in cloud architecture",
            ),
        }
    }
}

impl Default for EfficiencyAnalyzerAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for EfficiencyAnalyzerAgent {
    fn state(&self) -> &AgentState {
        &self.state
    }

    fn required_inputs(&self) -> &[&str] {
        &["architecture"]
    }

    async fn process(&self, input: Payload) -> AgentResult {
        self.set_status(AgentStatus::Processing);

        if let Err(error) = self.validate_input(&input) {
            self.set_status(AgentStatus::Error);
            return AgentResult::fail(error);
        }

        let architecture = &input["architecture"];
        let depth = input
            .get("analysis_depth")
            .and_then(Value::as_str)
            .unwrap_or("detailed")
            .to_string();
        let focus_areas: Vec<String> = input
            .get("focus_areas")
            .and_then(Value::as_array)
            .map(|areas| {
                areas
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let findings = analyze_architecture(architecture, &focus_areas);
        debug!(findings = findings.len(), "architecture analysis done");

        let savings = estimate_savings(&findings);
        let recommendations = consolidate_recommendations(&findings);
        let prioritized = prioritize(findings);

        let count_of = |severity: Severity| {
            prioritized
                .iter()
                .filter(|f| f.severity == severity)
                .count()
        };
        let summary = json!({
            "total_findings": prioritized.len(),
            "critical_count": count_of(Severity::Critical),
            "high_count": count_of(Severity::High),
            "medium_count": count_of(Severity::Medium),
            "low_count": count_of(Severity::Low),
            "estimated_savings": savings,
        });

        let inefficiencies = match serde_json::to_value(&prioritized) {
            Ok(value) => value,
            Err(error) => {
                self.set_status(AgentStatus::Error);
                return AgentResult::fail(format!("Error analyzing efficiency: {error}"));
            }
        };

        let mut data = Payload::new();
        data.insert("inefficiencies".into(), inefficiencies);
        data.insert("summary".into(), summary);
        data.insert("recommendations".into(), recommendations);
        data.insert(
            "analysis_metadata".into(),
            json!({
                "depth": depth,
                "focus_areas": if focus_areas.is_empty() {
                    json!("all")
                } else {
                    json!(focus_areas)
                },
            }),
        );

        let mut metadata = Payload::new();
        metadata.insert("agent_id".into(), json!(self.id().as_str()));

        self.set_status(AgentStatus::Completed);
        AgentResult::ok_with_metadata(data, metadata)
    }
}

// ============================================================================
// Analysis Heuristics
// ============================================================================

fn analyze_architecture(architecture: &Value, focus_areas: &[String]) -> Vec<Finding> {
    let in_focus =
        |area: &str| focus_areas.is_empty() || focus_areas.iter().any(|f| f == area);

    let mut findings = Vec::new();
    if in_focus("compute") {
        findings.extend(analyze_compute(section(architecture, "compute")));
    }
    if in_focus("storage") {
        findings.extend(analyze_storage(section(architecture, "storage")));
    }
    if in_focus("networking") {
        findings.extend(analyze_networking(section(architecture, "networking")));
    }
    if in_focus("security") {
        findings.extend(analyze_security(section(architecture, "security")));
    }
    findings
}

fn analyze_compute(compute: &Value) -> Vec<Finding> {
    let mut findings = Vec::new();

    for instance in list(compute, "instances") {
        let id = text(instance, "id");
        let utilization = &instance["utilization"];
        let cpu = num(utilization, "cpu");
        let memory = num(utilization, "memory");
        let monthly_cost = num(instance, "monthly_cost");

        if cpu < UNDERUTILIZED_CPU_PCT && memory < UNDERUTILIZED_MEM_PCT {
            findings.push(Finding {
                kind: "underutilized_instance".into(),
                resource_id: id.clone(),
                severity: Severity::High,
                description: format!(
                    "Instance {id} is underutilized (CPU: {cpu}%, Memory: {memory}%)"
                ),
                recommendation: "Consider right-sizing or consolidating instances".into(),
                potential_savings: monthly_cost * 0.5,
                category: "compute".into(),
            });
        }

        let instance_type = text(instance, "instance_type").to_lowercase();
        if instance_type.contains("large") && cpu < OVERPROVISIONED_CPU_PCT {
            findings.push(Finding {
                kind: "over_provisioned".into(),
                resource_id: id.clone(),
                severity: Severity::Medium,
                description: format!("Instance {id} may be over-provisioned"),
                recommendation: "Consider downsizing to a smaller instance type".into(),
                potential_savings: monthly_cost * 0.3,
                category: "compute".into(),
            });
        }
    }

    findings
}

fn analyze_storage(storage: &Value) -> Vec<Finding> {
    let mut findings = Vec::new();

    for bucket in list(storage, "buckets") {
        let id = text(bucket, "id");
        let size_gb = num(bucket, "size_gb");
        let last_accessed = bucket
            .get("last_accessed_days_ago")
            .and_then(Value::as_f64)
            .unwrap_or(f64::MAX);
        let monthly_cost = num(bucket, "monthly_cost");

        if size_gb == 0.0 {
            findings.push(Finding {
                kind: "empty_bucket".into(),
                resource_id: id.clone(),
                severity: Severity::Low,
                description: format!("Storage bucket {id} is empty"),
                recommendation: "Consider deleting if not needed".into(),
                potential_savings: monthly_cost,
                category: "storage".into(),
            });
        } else if last_accessed > COLD_STORAGE_DAYS {
            findings.push(Finding {
                kind: "unused_storage".into(),
                resource_id: id.clone(),
                severity: Severity::Medium,
                description: format!(
                    "Storage bucket {id} hasn't been accessed in {last_accessed} days"
                ),
                recommendation: "Consider moving to cheaper storage tier or archiving".into(),
                potential_savings: monthly_cost * 0.7,
                category: "storage".into(),
            });
        }
    }

    findings
}

fn analyze_networking(networking: &Value) -> Vec<Finding> {
    let mut findings = Vec::new();

    for lb in list(networking, "load_balancers") {
        let id = text(lb, "id");
        if num(lb, "active_connections") == 0.0 {
            findings.push(Finding {
                kind: "idle_load_balancer".into(),
                resource_id: id.clone(),
                severity: Severity::High,
                description: format!("Load balancer {id} has no active connections"),
                recommendation: "Consider removing if not in use".into(),
                potential_savings: num(lb, "monthly_cost"),
                category: "networking".into(),
            });
        }
    }

    findings
}

fn analyze_security(security: &Value) -> Vec<Finding> {
    let mut findings = Vec::new();

    if list(security, "iam_roles").is_empty() {
        findings.push(Finding {
            kind: "missing_iam".into(),
            resource_id: "global".into(),
            severity: Severity::Critical,
            description: "No IAM roles detected - potential security risk".into(),
            recommendation: "Implement proper IAM roles and policies".into(),
            potential_savings: 0.0,
            category: "security".into(),
        });
    }

    findings
}

// ============================================================================
// Aggregation
// ============================================================================

/// Severity first, higher potential savings breaking ties.
fn prioritize(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(b.potential_savings.total_cmp(&a.potential_savings))
    });
    findings
}

fn estimate_savings(findings: &[Finding]) -> Value {
    let total: f64 = findings.iter().map(|f| f.potential_savings).sum();

    let mut by_category: HashMap<String, f64> = HashMap::new();
    for finding in findings {
        *by_category.entry(finding.category.clone()).or_default() += finding.potential_savings;
    }

    json!({
        "total_monthly_savings": total,
        "total_annual_savings": cost::monthly_to_annual(total),
        "by_category": by_category,
        "currency": "USD",
    })
}

/// Consolidate findings of the same kind into one actionable recommendation,
/// first-seen order preserved.
fn consolidate_recommendations(findings: &[Finding]) -> Value {
    let mut grouped: Vec<(&str, Vec<&Finding>)> = Vec::new();
    for finding in findings {
        match grouped.iter_mut().find(|(kind, _)| *kind == finding.kind) {
            Some((_, group)) => group.push(finding),
            None => grouped.push((&finding.kind, vec![finding])),
        }
    }

    let recommendations: Vec<Value> = grouped
        .into_iter()
        .map(|(kind, group)| {
            json!({
                "type": kind,
                "count": group.len(),
                "total_potential_savings": group.iter().map(|f| f.potential_savings).sum::<f64>(),
                "action": group[0].recommendation,
                "affected_resources": group.iter().map(|f| &f.resource_id).collect::<Vec<_>>(),
            })
        })
        .collect();

    Value::Array(recommendations)
}

// ============================================================================
// JSON Helpers
// ============================================================================

fn section<'a>(value: &'a Value, key: &str) -> &'a Value {
    value.get(key).unwrap_or(&Value::Null)
}

fn list<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

fn num(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}
