//! Per-job context.
//!
//! Each tool invocation runs with its own context; nothing in it outlives
//! the call.

mod state;

pub use state::JobContext;
