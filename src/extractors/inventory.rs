//! Inventory extractor: dynamic-header CSV with `curr_qty` coerced to an
//! integer so downstream aggregation never sees free-form text

use super::Artifact;
use crate::error::Result;
use crate::tabular::{csv_dynamic, flatten_one_level};
use crate::wms::WmsClient;
use serde_json::{json, Map, Value};

/// Best-effort integer coercion; anything unparseable counts as zero
fn coerce_qty(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn flatten_inventory(record: &Value) -> Map<String, Value> {
    let mut flat = flatten_one_level(record);
    flat.insert(
        "curr_qty".to_string(),
        json!(coerce_qty(record.get("curr_qty"))),
    );
    flat
}

pub async fn extract_inventory(
    client: &WmsClient,
    limit_pages: Option<u32>,
) -> Result<Artifact> {
    let items = client.fetch_all_limited("inventory", limit_pages).await?;
    let flattened: Vec<_> = items.iter().map(flatten_inventory).collect();
    let (_, content) = csv_dynamic(&flattened)?;
    Ok(Artifact::new("inventory.csv", content))
}
