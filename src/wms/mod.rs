//! WMS entity fetch module
//!
//! The paginated fetch engine: discovers the page count for an entity,
//! fetches all pages concurrently up to the configured bound, retries
//! transient failures per page with exponential backoff, and aggregates
//! successful pages in completion order.

mod client;
mod types;

pub use client::WmsClient;
pub use types::{PageOutcome, PageResponse, Record};
