//! Architecture description model
//!
//! An architecture is a JSON document with a top-level `nodes` list, produced
//! by the LLM generator (or written by hand). Each node is an open bag of
//! service-specific attributes around a small fixed core (`id`, `type`,
//! `label`, `region`). The generator is not consistent about attribute
//! casing, so lookups go through candidate-key accessors and everything
//! missing falls back to per-service defaults. A missing or non-list
//! `nodes` key is the only fatal condition.

use crate::error::{ArchcostError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Service type tag selecting a cost resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Ec2,
    Rds,
    S3,
    Lambda,
    Ebs,
    DynamoDb,
    Sqs,
    Sns,
    Elb,
    ApiGateway,
    AccessAnalyzer,
    /// Unrecognized tag; skipped by the aggregation engine with a warning
    Other(String),
}

impl ServiceType {
    /// Pricing API service code (also the canonical node tag)
    pub fn service_code(&self) -> &str {
        match self {
            ServiceType::Ec2 => "AmazonEC2",
            ServiceType::Rds => "AmazonRDS",
            ServiceType::S3 => "AmazonS3",
            ServiceType::Lambda => "AWSLambda",
            ServiceType::Ebs => "AmazonEC2",
            ServiceType::DynamoDb => "AmazonDynamoDB",
            ServiceType::Sqs => "AmazonSQS",
            ServiceType::Sns => "AmazonSNS",
            ServiceType::Elb => "AWSELB",
            ServiceType::ApiGateway => "AmazonApiGateway",
            ServiceType::AccessAnalyzer => "AWSAccessAnalyzer",
            ServiceType::Other(tag) => tag,
        }
    }

    /// Canonical tag used in serialized output
    pub fn tag(&self) -> &str {
        match self {
            ServiceType::Ebs => "AmazonEBS",
            ServiceType::AccessAnalyzer => "AWSIAMAccessAnalyzer",
            other => other.service_code(),
        }
    }
}

impl From<String> for ServiceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "AmazonEC2" | "compute-instance" => ServiceType::Ec2,
            "AmazonRDS" | "managed-db" => ServiceType::Rds,
            "AmazonS3" | "object-store" => ServiceType::S3,
            "AWSLambda" | "serverless-function" => ServiceType::Lambda,
            "AmazonEBS" | "block-volume" => ServiceType::Ebs,
            "AmazonDynamoDB" | "kv-store" => ServiceType::DynamoDb,
            "AmazonSQS" | "queue" => ServiceType::Sqs,
            "AmazonSNS" | "topic" => ServiceType::Sns,
            "AWSELB" | "AmazonELB" | "load-balancer" => ServiceType::Elb,
            "AmazonApiGateway" | "AmazonAPIGateway" | "api-gateway" => ServiceType::ApiGateway,
            "AWSIAMAccessAnalyzer" | "AWSAccessAnalyzer" | "access-analyzer" => {
                ServiceType::AccessAnalyzer
            }
            _ => ServiceType::Other(s),
        }
    }
}

impl From<ServiceType> for String {
    fn from(t: ServiceType) -> Self {
        t.tag().to_string()
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One declared infrastructure component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Service-specific attributes, kept in input shape
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

impl Node {
    /// Human-readable name: label if present (generators also emit "name"
    /// or "Name"), otherwise the id
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or_else(|| self.attr_str(&["name", "Name"]))
            .unwrap_or(&self.id)
    }

    /// Declared region, tolerating the capitalized key some generators emit
    pub fn region_value(&self) -> Option<&str> {
        self.region.as_deref().or_else(|| self.attr_str(&["Region"]))
    }

    /// Look up an attribute by the first matching candidate key
    pub fn attr(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.attributes.get(*k))
    }

    pub fn attr_str(&self, keys: &[&str]) -> Option<&str> {
        self.attr(keys).and_then(Value::as_str)
    }

    pub fn attr_bool(&self, keys: &[&str]) -> bool {
        self.attr(keys).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// A parsed architecture description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Architecture {
    pub nodes: Vec<Node>,
}

impl Architecture {
    /// Parse an architecture document, enforcing the single structural
    /// invariant: a top-level `nodes` list must be present.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Some(raw_nodes) = value.get("nodes").and_then(Value::as_array) else {
            return Err(ArchcostError::Structural(
                "architecture JSON is missing a top-level 'nodes' list".to_string(),
            ));
        };

        let mut nodes = Vec::with_capacity(raw_nodes.len());
        for (i, raw) in raw_nodes.iter().enumerate() {
            match serde_json::from_value::<Node>(raw.clone()) {
                Ok(node) => nodes.push(node),
                Err(e) => {
                    tracing::warn!("Skipping malformed node at index {}: {}", i, e);
                }
            }
        }

        Ok(Architecture { nodes })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
