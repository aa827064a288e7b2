//! Order status extractor: the id/description lookup table

use super::{field, Artifact};
use crate::error::Result;
use crate::tabular::csv_fixed;
use crate::wms::WmsClient;
use serde_json::{Map, Value};

pub(crate) const FIELDNAMES: [&str; 2] = ["id", "description"];

pub(crate) fn normalize_order_status(status: &Value) -> Map<String, Value> {
    FIELDNAMES
        .iter()
        .map(|&name| (name.to_string(), field(status, name)))
        .collect()
}

pub async fn extract_order_status(
    client: &WmsClient,
    limit_pages: Option<u32>,
) -> Result<Artifact> {
    let items = client.fetch_all_limited("order_status", limit_pages).await?;
    let normalized: Vec<_> = items.iter().map(normalize_order_status).collect();
    let content = csv_fixed(&normalized, &FIELDNAMES)?;
    Ok(Artifact::new("order_status.csv", content))
}
