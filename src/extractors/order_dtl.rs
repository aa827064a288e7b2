//! Order detail extractor: fixed-header CSV
//!
//! The header matches the upstream order-detail report; nested reference
//! fields (`order_id`, `item_id`, `invn_attr_id`) expand into id/key/url
//! columns.

use super::{field, nested, Artifact};
use crate::error::Result;
use crate::tabular::csv_fixed;
use crate::wms::WmsClient;
use serde_json::{Map, Value};

pub(crate) const FIELDNAMES: [&str; 47] = [
    "id",
    "create_user",
    "create_ts",
    "mod_user",
    "mod_ts",
    "order_id_id",
    "order_id_key",
    "item_id_id",
    "item_id_key",
    "ord_qty",
    "orig_ord_qty",
    "alloc_qty",
    "req_cntr_nbr",
    "po_nbr",
    "shipment_nbr",
    "dest_facility_attr_a",
    "dest_facility_attr_b",
    "dest_facility_attr_c",
    "ref_nbr_1",
    "vas_activity_code",
    "cost",
    "sale_price",
    "host_ob_lpn_nbr",
    "spl_instr",
    "batch_number_id",
    "voucher_nbr",
    "voucher_amount",
    "voucher_exp_date",
    "req_pallet_nbr",
    "lock_code",
    "serial_nbr",
    "voucher_print_count",
    "ship_request_line",
    "unit_declared_value",
    "externally_planned_load_nbr",
    "invn_attr_id_id",
    "invn_attr_id_key",
    "invn_attr_id_url",
    "internal_text_field_1",
    "orig_item_code",
    "erp_source_line_ref",
    "erp_source_shipment_ref",
    "erp_fulfillment_line_ref",
    "min_shipping_tolerance_percentage",
    "max_shipping_tolerance_percentage",
    "status_id",
    "order_dtl_original_seq_nbr",
];

pub(crate) fn normalize_order_dtl(order: &Value) -> Map<String, Value> {
    FIELDNAMES
        .iter()
        .map(|&name| {
            let value = match name {
                "order_id_id" => nested(order, "order_id", "id"),
                "order_id_key" => nested(order, "order_id", "key"),
                "item_id_id" => nested(order, "item_id", "id"),
                "item_id_key" => nested(order, "item_id", "key"),
                "invn_attr_id_id" => nested(order, "invn_attr_id", "id"),
                "invn_attr_id_key" => nested(order, "invn_attr_id", "key"),
                "invn_attr_id_url" => nested(order, "invn_attr_id", "url"),
                _ => field(order, name),
            };
            (name.to_string(), value)
        })
        .collect()
}

pub async fn extract_order_dtl(
    client: &WmsClient,
    limit_pages: Option<u32>,
) -> Result<Artifact> {
    let items = client.fetch_all_limited("order_dtl", limit_pages).await?;
    let normalized: Vec<_> = items.iter().map(normalize_order_dtl).collect();
    let content = csv_fixed(&normalized, &FIELDNAMES)?;
    Ok(Artifact::new("order_dtl.csv", content))
}
