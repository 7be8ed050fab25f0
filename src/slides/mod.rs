//! Presentation model and the pure request-building core.
//!
//! Nothing in here talks to the network; `tools::slides` feeds these
//! functions with fetched documents and submits what they build.

pub mod builders;
pub mod detect;
pub mod model;
pub mod props;
pub mod requests;
pub mod search;
pub mod units;
pub mod validate;
pub mod walker;

pub use model::{ElementKind, Page, PageElement, PageKind, Presentation};
pub use requests::Request;
