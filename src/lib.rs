//! # WMS Extract
//!
//! Extraction pipeline for a WMS REST API: fetch paginated entities
//! concurrently, flatten them to CSV, derive a combined orders report, and
//! publish the results to Google Drive.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌────────────┐    ┌──────────────┐    ┌──────────┐
//! │ WMS REST API │ →  │ Extractors │ →  │ Combined     │ →  │ Drive /  │
//! │ (paged JSON) │    │ (CSV rows) │    │ report (SQL) │    │ local dir│
//! └──────────────┘    └────────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Page fetches run under a bounded concurrency cap with per-page retries;
//! a page that exhausts its retries is dropped without failing the run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

/// Error types
pub mod error;

/// Run configuration
pub mod config;

/// Paginated WMS API client
pub mod wms;

/// Record flattening and CSV serialization
pub mod tabular;

/// Per-entity extractors
pub mod extractors;

/// Combined orders report
pub mod report;

/// SQL script execution
pub mod database;

/// Google Drive publication
pub mod drive;

/// Command-line interface
pub mod cli;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use extractors::Artifact;
pub use wms::WmsClient;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
