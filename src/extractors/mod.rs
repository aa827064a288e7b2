//! Entity extractors
//!
//! One extractor per WMS entity. Each one fetches every record through the
//! paginated client, shapes the records into flat rows, and serializes a
//! named CSV artifact. Field-rename tables mirror the upstream report
//! contract and carry no logic beyond "copy field A into column B".

mod container;
mod inventory;
pub(crate) mod order_dtl;
pub(crate) mod order_hdr;
pub(crate) mod order_status;

pub use container::extract_container;
pub use inventory::extract_inventory;
pub use order_dtl::extract_order_dtl;
pub use order_hdr::extract_order_hdr;
pub use order_status::extract_order_status;

use bytes::Bytes;

/// One named CSV payload ready to publish
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Target file name, e.g. `container.csv`
    pub name: String,
    /// CSV content
    pub content: Bytes,
}

impl Artifact {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Pull a nested sub-field into a flat column value
pub(crate) fn nested(record: &serde_json::Value, key: &str, sub: &str) -> serde_json::Value {
    crate::tabular::to_scalar(
        record
            .pointer(&format!("/{key}/{sub}"))
            .unwrap_or(&serde_json::Value::Null),
    )
}

/// Copy a top-level field into a flat column value
pub(crate) fn field(record: &serde_json::Value, key: &str) -> serde_json::Value {
    crate::tabular::to_scalar(record.get(key).unwrap_or(&serde_json::Value::Null))
}
