//! Tabular shaping
//!
//! Converts opaque API records into flat rows and serializes rows to CSV
//! payloads, either with a dynamic (union-of-keys) or a fixed header.

mod csv;
mod flatten;

pub use csv::{csv_dynamic, csv_fixed};
pub use flatten::{flatten_one_level, to_scalar};
