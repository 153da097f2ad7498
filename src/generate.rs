//! LLM-assisted architecture generation
//!
//! Turns free-form requirements into an architecture JSON the estimator can
//! price. The prompt pins the node shape to the same tags and attribute
//! names the resolvers expect; the response is reduced to its first JSON
//! object (models like to wrap output in prose or code fences) and parsed
//! through the normal structural validation.

use crate::architecture::Architecture;
use crate::error::{ArchcostError, Result};
use crate::llm::ProviderChain;
use regex::Regex;
use tracing::debug;

const SYSTEM_MESSAGE: &str = "You are an AWS architecture expert. Generate a detailed \
architecture JSON that follows the provided template structure. Include all necessary AWS \
services, their configurations, and interconnections. Focus on creating a well-optimized, \
secure, and scalable architecture.";

const TEMPLATE: &str = r#"{
  "nodes": [
    {"id": "web-server", "type": "AmazonEC2", "label": "Web Server", "region": "us-east-1",
     "InstanceType": "t3.medium", "os": "Linux", "quantity": 2},
    {"id": "app-db", "type": "AmazonRDS", "label": "Application DB", "region": "us-east-1",
     "DBEngine": "MySQL", "DBInstanceClass": "db.t3.medium", "Storage": 100, "MultiAZ": true},
    {"id": "assets", "type": "AmazonS3", "label": "Static Assets", "region": "us-east-1",
     "Storage": "500GB"},
    {"id": "api", "type": "AWSLambda", "label": "API Functions", "region": "us-east-1",
     "Memory": "256MB", "Invocations": 5000000, "AvgDuration": 200}
  ]
}"#;

fn build_prompt(requirements: &str) -> String {
    format!(
        "Based on the following AWS architecture requirements:\n{}\n\n\
         Considering these requirements, please generate an AWS architecture in JSON format, \
         structured similarly to this example:\n{}\n\n\
         Ensure the architecture is optimized for low latency, high availability, and cost \
         efficiency. Respond with the JSON document only.",
        requirements, TEMPLATE
    )
}

/// Extract the first JSON object from an LLM response.
pub fn extract_json(response: &str) -> Option<&str> {
    // Greedy brace match across lines, same trade-off as matching inside
    // code fences: the outermost object wins.
    let re = Regex::new(r"(?s)\{.*\}").expect("valid regex");
    re.find(response).map(|m| m.as_str())
}

/// Generate an architecture from free-form requirements text.
pub async fn generate_architecture(
    chain: &ProviderChain,
    requirements: &str,
) -> Result<Architecture> {
    let prompt = build_prompt(requirements);
    let response = chain.complete(SYSTEM_MESSAGE, &prompt).await?;
    debug!("LLM response: {} bytes", response.len());

    let json = extract_json(&response).ok_or_else(|| {
        ArchcostError::Structural("LLM response contained no JSON object".to_string())
    })?;

    Architecture::from_json_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_bare() {
        let response = r#"{"nodes": []}"#;
        assert_eq!(extract_json(response), Some(r#"{"nodes": []}"#));
    }

    #[test]
    fn test_extract_json_fenced() {
        let response = "Here is your architecture:\n```json\n{\"nodes\": [{\"id\": \"a\"}]}\n```\nEnjoy!";
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(serde_json::from_str::<serde_json::Value>(json).is_ok());
    }

    #[test]
    fn test_extract_json_none() {
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn test_template_parses() {
        let arch = Architecture::from_json_str(TEMPLATE).unwrap();
        assert_eq!(arch.nodes.len(), 4);
    }

    #[test]
    fn test_prompt_contains_requirements() {
        let prompt = build_prompt("A photo-sharing app with 1M users");
        assert!(prompt.contains("photo-sharing"));
        assert!(prompt.contains("\"nodes\""));
    }
}
