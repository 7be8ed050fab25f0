//! Tool trait and types.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::JobContext;
use crate::error::ToolError;

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The result data.
    pub result: serde_json::Value,
    /// Time taken.
    pub duration: Duration,
}

impl ToolOutput {
    /// Create a successful output with a JSON result.
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self { result, duration }
    }
}

/// Definition of a tool's parameters using JSON Schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A single capability exposed to hosts.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name.
    fn name(&self) -> &str;

    /// Get a description of what the tool does.
    fn description(&self) -> &str;

    /// Get the JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &JobContext,
    ) -> Result<ToolOutput, ToolError>;

    /// Whether this tool changes or creates remote files.
    ///
    /// Hosts may ask for confirmation before running such tools.
    fn requires_approval(&self) -> bool {
        false
    }

    /// Get the tool schema for function calling.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PingTool;

    #[async_trait]
    impl Tool for PingTool {
        fn name(&self) -> &str {
            "ping"
        }

        fn description(&self) -> &str {
            "Answers pong."
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(
            &self,
            _params: serde_json::Value,
            _ctx: &JobContext,
        ) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::success(
                serde_json::json!("pong"),
                Duration::from_millis(1),
            ))
        }
    }

    #[tokio::test]
    async fn test_execute_and_schema() {
        let tool = PingTool;
        let output = tool
            .execute(serde_json::json!({}), &JobContext::default())
            .await
            .unwrap();
        assert_eq!(output.result, serde_json::json!("pong"));

        let schema = tool.schema();
        assert_eq!(schema.name, "ping");
        assert!(!schema.description.is_empty());
        assert!(!tool.requires_approval());
    }
}
