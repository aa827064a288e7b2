//! Order header extractor: fixed-header CSV
//!
//! Carries the audit fields, facility/order-type reference keys, the
//! customer and ship-to address blocks, and the custom fields the combined
//! orders report projects.

use super::{field, nested, Artifact};
use crate::error::Result;
use crate::tabular::csv_fixed;
use crate::wms::WmsClient;
use serde_json::{Map, Value};

pub(crate) const FIELDNAMES: [&str; 34] = [
    "id",
    "create_user",
    "create_ts",
    "mod_user",
    "mod_ts",
    "facility_id_id",
    "facility_id_key",
    "order_nbr",
    "order_type_id_id",
    "order_type_id_key",
    "status_id",
    "ord_date",
    "req_ship_date",
    "order_shipped_ts",
    "priority",
    "cust_nbr",
    "cust_name",
    "cust_addr",
    "cust_addr2",
    "cust_city",
    "cust_state",
    "cust_zip",
    "shipto_name",
    "shipto_addr",
    "shipto_addr2",
    "shipto_city",
    "shipto_state",
    "shipto_zip",
    "cust_field_2",
    "cust_date_1",
    "cust_short_text_1",
    "cust_short_text_2",
    "cust_long_text_1",
    "cust_long_text_2",
];

pub(crate) fn normalize_order_hdr(order: &Value) -> Map<String, Value> {
    FIELDNAMES
        .iter()
        .map(|&name| {
            let value = match name {
                "facility_id_id" => nested(order, "facility_id", "id"),
                "facility_id_key" => nested(order, "facility_id", "key"),
                "order_type_id_id" => nested(order, "order_type_id", "id"),
                "order_type_id_key" => nested(order, "order_type_id", "key"),
                _ => field(order, name),
            };
            (name.to_string(), value)
        })
        .collect()
}

pub async fn extract_order_hdr(
    client: &WmsClient,
    limit_pages: Option<u32>,
) -> Result<Artifact> {
    let items = client.fetch_all_limited("order_hdr", limit_pages).await?;
    let normalized: Vec<_> = items.iter().map(normalize_order_hdr).collect();
    let content = csv_fixed(&normalized, &FIELDNAMES)?;
    Ok(Artifact::new("order_hdr.csv", content))
}
