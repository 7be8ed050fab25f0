//! Tool system.
//!
//! Every capability is a [`Tool`]: a named, schema-described operation a
//! host can list and run with JSON parameters.

pub mod slides;

mod registry;
mod tool;

pub use crate::error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolOutput, ToolSchema};
