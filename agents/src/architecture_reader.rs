// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Architecture reader agent.
//!
//! Ingests cloud architecture descriptions from inline inventories,
//! Terraform state files, or CloudFormation/ARM templates, and normalizes
//! them into the structured document downstream agents consume.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use costwise_core::{Agent, AgentResult, AgentState, AgentStatus, Payload};

pub struct ArchitectureReaderAgent {
    state: AgentState,
}

impl ArchitectureReaderAgent {
    pub fn new() -> Self {
        Self {
            state: AgentState::new(
                "architecture_reader",
                "Architecture Reader",
                "Reads and normalizes cloud architecture from multiple sources",
            ),
        }
    }
}

impl Default for ArchitectureReaderAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for ArchitectureReaderAgent {
    fn state(&self) -> &AgentState {
        &self.state
    }

    fn required_inputs(&self) -> &[&str] {
        &["cloud_provider", "credentials", "source_type"]
    }

    async fn process(&self, input: Payload) -> AgentResult {
        self.set_status(AgentStatus::Processing);

        if let Err(error) = self.validate_input(&input) {
            self.set_status(AgentStatus::Error);
            return AgentResult::fail(error);
        }

        let cloud_provider = input
            .get("cloud_provider")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        let source_type = input
            .get("source_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        let source_path = input.get("source_path").and_then(Value::as_str);
        let region = input.get("region").and_then(Value::as_str);

        let raw = match source_type.as_str() {
            "api" => self.read_inline(&cloud_provider, &input),
            "terraform" => self.read_terraform(source_path),
            "cloudformation" => self.read_cloudformation(&cloud_provider, source_path),
            "documentation" => {
                Err("Documentation extraction requires a configured language model client".into())
            }
            other => Err(format!("Unsupported source_type: {other}")),
        };

        let raw = match raw {
            Ok(raw) => raw,
            Err(error) => {
                self.set_status(AgentStatus::Error);
                return AgentResult::fail(error);
            }
        };

        let architecture = structure_architecture(&raw, &cloud_provider);
        let resource_count = architecture["resources"]
            .as_array()
            .map(Vec::len)
            .unwrap_or(0);
        let services = architecture["services"].clone();

        tracing::debug!(
            provider = %cloud_provider,
            source = %source_type,
            resources = resource_count,
            "architecture normalized"
        );

        let mut data = Payload::new();
        data.insert("architecture".into(), architecture);
        data.insert("cloud_provider".into(), json!(cloud_provider));
        data.insert("region".into(), json!(region));
        data.insert("source_type".into(), json!(source_type));
        data.insert("resource_count".into(), json!(resource_count));
        data.insert("services".into(), services);

        let mut metadata = Payload::new();
        metadata.insert("agent_id".into(), json!(self.id().as_str()));

        self.set_status(AgentStatus::Completed);
        AgentResult::ok_with_metadata(data, metadata)
    }
}

/// Raw resources plus the extraction method that produced them.
struct RawInventory {
    resources: Vec<Value>,
    source: &'static str,
}

impl ArchitectureReaderAgent {
    /// Live API discovery is out of scope; callers supply the inventory
    /// under `resources` alongside their credentials.
    fn read_inline(&self, cloud_provider: &str, input: &Payload) -> Result<RawInventory, String> {
        match cloud_provider {
            "aws" | "azure" => Ok(RawInventory {
                resources: input
                    .get("resources")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                source: "api",
            }),
            other => Err(format!("Unsupported cloud provider: {other}")),
        }
    }

    fn read_terraform(&self, source_path: Option<&str>) -> Result<RawInventory, String> {
        let path = source_path.ok_or("'source_path' is required for terraform sources")?;
        let text = fs::read_to_string(Path::new(path))
            .map_err(|e| format!("Failed to read Terraform state {path}: {e}"))?;
        let state: Value = serde_json::from_str(&text)
            .map_err(|e| format!("Invalid Terraform state {path}: {e}"))?;

        let mut resources = Vec::new();
        for entry in state
            .get("resources")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let tf_type = entry.get("type").and_then(Value::as_str).unwrap_or("");
            let Some(kind) = terraform_resource_kind(tf_type) else {
                continue;
            };
            for instance in entry
                .get("instances")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let mut resource = instance
                    .get("attributes")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                resource.insert("type".into(), json!(kind));
                if let Some(name) = entry.get("name").and_then(Value::as_str) {
                    resource.entry("name").or_insert(json!(name));
                }
                resources.push(Value::Object(resource));
            }
        }

        Ok(RawInventory {
            resources,
            source: "terraform",
        })
    }

    fn read_cloudformation(
        &self,
        cloud_provider: &str,
        source_path: Option<&str>,
    ) -> Result<RawInventory, String> {
        let path = source_path.ok_or("'source_path' is required for cloudformation sources")?;
        let text = fs::read_to_string(Path::new(path))
            .map_err(|e| format!("Failed to read template {path}: {e}"))?;
        // YAML is a superset of JSON, so one parser covers both encodings.
        let template: Value = serde_yaml::from_str(&text)
            .map_err(|e| format!("Invalid template {path}: {e}"))?;

        let mut resources = Vec::new();
        for (logical_id, entry) in template
            .get("Resources")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
        {
            let cfn_type = entry.get("Type").and_then(Value::as_str).unwrap_or("");
            let Some(kind) = cloudformation_resource_kind(cfn_type) else {
                continue;
            };
            let mut resource = entry
                .get("Properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            resource.insert("id".into(), json!(logical_id));
            resource.insert("type".into(), json!(kind));
            resources.push(Value::Object(resource));
        }

        Ok(RawInventory {
            resources,
            source: if cloud_provider == "aws" {
                "cloudformation"
            } else {
                "arm_template"
            },
        })
    }
}

fn terraform_resource_kind(tf_type: &str) -> Option<&'static str> {
    Some(match tf_type {
        "aws_instance" | "azurerm_virtual_machine" => "instance",
        "aws_s3_bucket" | "azurerm_storage_account" => "bucket",
        "aws_db_instance" | "azurerm_sql_database" => "database",
        "aws_ebs_volume" | "azurerm_managed_disk" => "volume",
        "aws_lb" | "aws_elb" | "azurerm_lb" => "load_balancer",
        "aws_vpc" | "azurerm_virtual_network" => "vpc",
        "aws_subnet" | "azurerm_subnet" => "subnet",
        "aws_security_group" | "azurerm_network_security_group" => "security_group",
        "aws_iam_role" => "iam_role",
        "aws_iam_policy" => "policy",
        "aws_lambda_function" | "azurerm_function_app" => "function",
        _ => return None,
    })
}

fn cloudformation_resource_kind(cfn_type: &str) -> Option<&'static str> {
    Some(match cfn_type {
        "AWS::EC2::Instance" => "instance",
        "AWS::S3::Bucket" => "bucket",
        "AWS::RDS::DBInstance" => "database",
        "AWS::EC2::Volume" => "volume",
        "AWS::ElasticLoadBalancingV2::LoadBalancer" => "load_balancer",
        "AWS::EC2::VPC" => "vpc",
        "AWS::EC2::Subnet" => "subnet",
        "AWS::EC2::SecurityGroup" => "security_group",
        "AWS::IAM::Role" => "iam_role",
        "AWS::IAM::Policy" => "policy",
        "AWS::Lambda::Function" => "function",
        _ => return None,
    })
}

/// Normalizes a raw inventory into the standard architecture document.
fn structure_architecture(raw: &RawInventory, cloud_provider: &str) -> Value {
    let resources = &raw.resources;

    let by_type = |kinds: &[&str]| -> Vec<Value> {
        resources
            .iter()
            .filter(|r| {
                r.get("type")
                    .and_then(Value::as_str)
                    .map(|t| kinds.contains(&t))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    };

    let mut services: Vec<String> = resources
        .iter()
        .filter_map(|r| r.get("service").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    services.sort();
    services.dedup();

    json!({
        "provider": cloud_provider,
        "resources": resources,
        "services": services,
        "networking": {
            "vpcs": by_type(&["vpc"]),
            "subnets": by_type(&["subnet"]),
            "load_balancers": by_type(&["load_balancer"]),
            "security_groups": by_type(&["security_group"]),
        },
        "compute": {
            "instances": by_type(&["instance"]),
            "containers": by_type(&["container"]),
            "serverless": by_type(&["function"]),
        },
        "storage": {
            "buckets": by_type(&["bucket"]),
            "databases": by_type(&["database"]),
            "volumes": by_type(&["volume"]),
        },
        "security": {
            "iam_roles": by_type(&["iam_role"]),
            "policies": by_type(&["policy"]),
            "certificates": by_type(&["certificate"]),
        },
        "metadata": {
            "total_resources": resources.len(),
            "extraction_method": raw.source,
        },
    })
}
