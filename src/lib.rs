//! slidesmith: request-building tools for editing Google Slides
//! presentations through the Slides, Drive and Translation APIs.
//!
//! - [`slides`]: document model, tree walking, validation and the request
//!   builders that turn tool input into Slides `batchUpdate` requests
//! - [`google`]: collaborator traits and their reqwest-backed clients
//! - [`tools`]: one [`tools::Tool`] per capability plus the registry

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod google;
pub mod slides;
pub mod testing;
pub mod tools;

pub use config::Config;
pub use error::{ConfigError, ToolError};
