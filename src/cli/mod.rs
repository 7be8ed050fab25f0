//! Command-line host for the tools.
//!
//! Lists tools, prints their schemas, and runs one with JSON parameters.
//! Results go to stdout as JSON; logs go to stderr.

use clap::{Parser, Subcommand};

use crate::context::JobContext;
use crate::error::ToolError;
use crate::tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(name = "slidesmith", version, about = "Edit Google Slides presentations from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List available tools
    Tools,

    /// Print a tool's description and parameter schema
    Schema {
        /// Tool name (e.g., "add_image")
        tool: String,
    },

    /// Run a tool
    Run {
        /// Tool name (e.g., "search_text")
        tool: String,

        /// Parameters as a JSON object, or @path to read them from a file
        #[arg(short, long, default_value = "{}")]
        params: String,
    },
}

/// Parse `--params`: inline JSON, or `@path` naming a JSON file.
pub fn parse_params_arg(raw: &str) -> anyhow::Result<serde_json::Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read params file {}: {}", path, e))?,
        None => raw.to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| anyhow::anyhow!("Params are not valid JSON: {}", e))?;
    if !value.is_object() {
        anyhow::bail!("Params must be a JSON object");
    }
    Ok(value)
}

/// Look up and run one tool.
pub async fn execute_tool(
    registry: &ToolRegistry,
    name: &str,
    params: serde_json::Value,
    ctx: &JobContext,
) -> Result<serde_json::Value, ToolError> {
    let tool = registry
        .get(name)
        .await
        .ok_or_else(|| ToolError::InvalidParameters(format!("unknown tool '{}'", name)))?;
    let output = tool.execute(params, ctx).await?;
    tracing::debug!("[{}] {} finished in {:?}", ctx.job_id, name, output.duration);
    Ok(output.result)
}

/// Run a CLI command against a populated registry.
pub async fn run_command(command: Command, registry: &ToolRegistry) -> anyhow::Result<()> {
    match command {
        Command::Tools => {
            for schema in registry.schemas().await {
                let summary = schema.description.split(". ").next().unwrap_or_default();
                println!("{:<24} {}", schema.name, summary.trim_end_matches('.'));
            }
            Ok(())
        }
        Command::Schema { tool } => {
            let tool = registry
                .get(&tool)
                .await
                .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", tool))?;
            println!("{}", serde_json::to_string_pretty(&tool.schema())?);
            Ok(())
        }
        Command::Run { tool, params } => {
            let params = parse_params_arg(&params)?;
            let ctx = JobContext::new();
            match execute_tool(registry, &tool, params, &ctx).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    Ok(())
                }
                Err(e) => {
                    let body = serde_json::json!({ "error": e.to_json() });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    anyhow::bail!("{} failed with {}", tool, e.kind())
                }
            }
        }
    }
}
