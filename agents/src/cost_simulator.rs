// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Cost simulator agent.
//!
//! Projects the financial impact of infrastructure changes: current cost
//! breakdowns, post-optimization projections, what-if scenarios, and
//! side-by-side scenario comparison.

use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;

use costwise_core::{Agent, AgentResult, AgentState, AgentStatus, Payload};

use crate::cost;

pub struct CostSimulatorAgent {
    state: AgentState,
    currency: String,
}

impl CostSimulatorAgent {
    pub fn new() -> Self {
        Self::with_currency("USD")
    }

    pub fn with_currency(currency: impl Into<String>) -> Self {
        Self {
            state: AgentState::new(
                "cost_simulator",
                "Cost Simulator",
                "Runs cost simulations and projections for cloud infrastructure",
            ),
            currency: currency.into(),
        }
    }
}

impl Default for CostSimulatorAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for CostSimulatorAgent {
    fn state(&self) -> &AgentState {
        &self.state
    }

    /// Flexible by design: works with either `architecture` or
    /// `inefficiencies`, so nothing is unconditionally required.
    fn required_inputs(&self) -> &[&str] {
        &[]
    }

    async fn process(&self, input: Payload) -> AgentResult {
        self.set_status(AgentStatus::Processing);

        let architecture = input.get("architecture");
        let inefficiencies = input.get("inefficiencies");

        if architecture.is_none() && inefficiencies.is_none() {
            self.set_status(AgentStatus::Error);
            return AgentResult::fail(
                "Either 'architecture' or 'inefficiencies' must be provided",
            );
        }

        let simulation_type = input
            .get("simulation_type")
            .and_then(Value::as_str)
            .unwrap_or("current");
        let time_period = input
            .get("time_period")
            .and_then(Value::as_str)
            .unwrap_or("monthly");
        let scenarios = input
            .get("scenarios")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let outcome = match simulation_type {
            "current" => self.require_architecture(architecture, simulation_type)
                .map(|arch| self.simulate_current(arch)),
            "projected" => self.require_architecture(architecture, simulation_type)
                .map(|arch| {
                    let findings = inefficiencies
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default();
                    self.simulate_projected(arch, &findings, time_period)
                }),
            "what_if" => self.require_architecture(architecture, simulation_type)
                .map(|arch| self.simulate_what_if(arch, &scenarios, time_period)),
            "comparison" => self.require_architecture(architecture, simulation_type)
                .map(|arch| self.compare_scenarios(arch, &scenarios, time_period)),
            other => Err(format!("Unknown simulation_type: {other}")),
        };

        match outcome {
            Ok(data) => {
                let mut metadata = Payload::new();
                metadata.insert("agent_id".into(), json!(self.id().as_str()));
                metadata.insert("simulation_type".into(), json!(simulation_type));
                metadata.insert("timestamp".into(), json!(Utc::now().to_rfc3339()));

                self.set_status(AgentStatus::Completed);
                AgentResult::ok_with_metadata(data, metadata)
            }
            Err(error) => {
                self.set_status(AgentStatus::Error);
                AgentResult::fail(error)
            }
        }
    }
}

impl CostSimulatorAgent {
    fn require_architecture<'a>(
        &self,
        architecture: Option<&'a Value>,
        simulation_type: &str,
    ) -> Result<&'a Value, String> {
        architecture.ok_or_else(|| {
            format!("'architecture' is required for simulation_type '{simulation_type}'")
        })
    }

    /// Current per-category cost breakdown.
    fn simulate_current(&self, architecture: &Value) -> Payload {
        let breakdown = HashMap::from([
            ("compute".to_string(), sum_costs(architecture, "compute", "instances")),
            ("storage".to_string(), sum_costs(architecture, "storage", "buckets")),
            (
                "networking".to_string(),
                sum_costs(architecture, "networking", "load_balancers"),
            ),
            ("security".to_string(), 0.0),
            ("other".to_string(), 0.0),
        ]);

        let summary = cost::breakdown_summary(&breakdown);
        let total = summary.total;

        let mut data = Payload::new();
        data.insert(
            "current_costs".into(),
            json!({
                "monthly": total,
                "annual": cost::monthly_to_annual(total),
                "breakdown": breakdown,
                "breakdown_percentages": summary.percentages,
                "largest_category": summary.largest_category,
                "currency": self.currency,
            }),
        );
        data.insert(
            "resource_count".into(),
            json!({
                "compute": count_items(architecture, "compute", "instances"),
                "storage": count_items(architecture, "storage", "buckets"),
                "networking": count_items(architecture, "networking", "load_balancers"),
            }),
        );
        data
    }

    /// Costs after applying every finding's potential savings.
    fn simulate_projected(
        &self,
        architecture: &Value,
        inefficiencies: &[Value],
        time_period: &str,
    ) -> Payload {
        let current = self.simulate_current(architecture);
        let current_monthly = current["current_costs"]["monthly"]
            .as_f64()
            .unwrap_or(0.0);

        let total_savings: f64 = inefficiencies
            .iter()
            .map(|f| f.get("potential_savings").and_then(Value::as_f64).unwrap_or(0.0))
            .sum();
        let projected_monthly = current_monthly - total_savings;

        let multiplier = match time_period {
            "monthly" => 1.0,
            "annual" => 12.0,
            days => days.parse::<f64>().map(|d| d / 30.0).unwrap_or(1.0),
        };

        let mut data = Payload::new();
        data.insert("current_costs".into(), current["current_costs"].clone());
        data.insert(
            "projected_costs".into(),
            json!({
                "monthly": projected_monthly,
                "annual": cost::monthly_to_annual(projected_monthly),
                "currency": self.currency,
            }),
        );
        data.insert(
            "savings".into(),
            json!({
                "monthly": total_savings,
                "annual": cost::monthly_to_annual(total_savings),
                "percentage": cost::savings_percentage(current_monthly, projected_monthly),
                "currency": self.currency,
            }),
        );
        data.insert("projection_period".into(), json!(time_period));
        data.insert("projected_total".into(), json!(projected_monthly * multiplier));
        data
    }

    fn simulate_what_if(
        &self,
        architecture: &Value,
        scenarios: &[Value],
        time_period: &str,
    ) -> Payload {
        let current = self.simulate_current(architecture);
        let current_monthly = current["current_costs"]["monthly"]
            .as_f64()
            .unwrap_or(0.0);

        let scenario_results: Vec<Value> = scenarios
            .iter()
            .map(|scenario| {
                let name = scenario
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unnamed Scenario");
                let changes = scenario
                    .get("changes")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();

                let scenario_cost = apply_changes(current_monthly, &changes);
                let difference = scenario_cost - current_monthly;
                let difference_percentage = if scenario_cost < current_monthly {
                    cost::savings_percentage(current_monthly, scenario_cost)
                } else if scenario_cost > current_monthly {
                    -cost::savings_percentage(scenario_cost, current_monthly)
                } else {
                    0.0
                };

                json!({
                    "name": name,
                    "monthly_cost": scenario_cost,
                    "annual_cost": cost::monthly_to_annual(scenario_cost),
                    "difference": difference,
                    "difference_percentage": difference_percentage,
                    "changes": changes,
                })
            })
            .collect();

        let mut data = Payload::new();
        data.insert("current_costs".into(), current["current_costs"].clone());
        data.insert("scenarios".into(), Value::Array(scenario_results));
        data.insert("time_period".into(), json!(time_period));
        data.insert("currency".into(), json!(self.currency));
        data
    }

    /// What-if plus best/worst/spread.
    fn compare_scenarios(
        &self,
        architecture: &Value,
        scenarios: &[Value],
        time_period: &str,
    ) -> Payload {
        let mut data = self.simulate_what_if(architecture, scenarios, time_period);

        let monthly = |scenario: &Value| {
            scenario
                .get("monthly_cost")
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        let results = data["scenarios"].as_array().cloned().unwrap_or_default();
        let best = results
            .iter()
            .min_by(|a, b| monthly(a).total_cmp(&monthly(b)))
            .cloned();
        let worst = results
            .iter()
            .max_by(|a, b| monthly(a).total_cmp(&monthly(b)))
            .cloned();

        let spread = match (&best, &worst) {
            (Some(b), Some(w)) => monthly(w) - monthly(b),
            _ => 0.0,
        };
        data.insert(
            "comparison".into(),
            json!({
                "best_scenario": best,
                "worst_scenario": worst,
                "cost_range": {
                    "min": best.as_ref().map(|s| monthly(s)).unwrap_or(0.0),
                    "max": worst.as_ref().map(|s| monthly(s)).unwrap_or(0.0),
                    "spread": spread,
                },
            }),
        );
        data
    }
}

fn apply_changes(base_monthly: f64, changes: &[Value]) -> f64 {
    let mut total = base_monthly;
    for change in changes {
        let value = change.get("value").and_then(Value::as_f64).unwrap_or(0.0);
        match change.get("type").and_then(Value::as_str) {
            Some("add_resource") => total += value,
            Some("remove_resource") => total -= value,
            // Value carries the delta for modifications.
            Some("modify_resource") => total += value,
            Some("scale") => {
                let factor = change.get("factor").and_then(Value::as_f64).unwrap_or(1.0);
                let affected = change
                    .get("affected_cost")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                total += affected * (factor - 1.0);
            }
            _ => {}
        }
    }
    total
}

fn sum_costs(architecture: &Value, category: &str, item_key: &str) -> f64 {
    architecture
        .get(category)
        .and_then(|c| c.get(item_key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| item.get("monthly_cost").and_then(Value::as_f64).unwrap_or(0.0))
                .sum()
        })
        .unwrap_or(0.0)
}

fn count_items(architecture: &Value, category: &str, item_key: &str) -> usize {
    architecture
        .get(category)
        .and_then(|c| c.get(item_key))
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}
