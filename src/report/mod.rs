//! Combined orders report
//!
//! Loads the order header, detail, and status CSVs into an in-memory
//! DuckDB connection and runs the fixed join + projection that produces
//! the shipment status report. Column aliases and status labels are the
//! published report contract and must not change.

use crate::error::{Error, Result};
use bytes::Bytes;
use duckdb::Connection;
use std::path::{Path, PathBuf};

/// File name the combined report is published under
pub const COMBINED_REPORT_NAME: &str = "base_status_pedidos_wms_sae.csv";

const REPORT_QUERY: &str = r"
    SELECT
        h.facility_id_key AS filial,
        CAST(d.create_ts AS DATE) AS dt_criacao,
        CAST(d.create_ts AS TIME) AS hr_criacao,
        CAST(d.mod_ts AS DATE) AS dt_modificacao,
        CAST(d.mod_ts AS TIME) AS hr_modificacao,
        h.cust_short_text_1 AS orderm_frete,
        h.order_nbr AS remessa,
        d.item_id_key AS item,
        d.ord_qty AS qtd_pedido,
        d.orig_ord_qty AS qtd_pedido_original,
        d.alloc_qty AS qtd_alocada,
        h.order_type_id_key AS tipo_pedido,
        h.ord_date AS dt_ordem,
        h.req_ship_date AS dt_embarque_obrigatoria,
        CASE
            WHEN h.status_id = 0  THEN 'Criado'
            WHEN h.status_id = 10 THEN 'Parcialmente alocado'
            WHEN h.status_id = 20 THEN 'Alocado'
            WHEN h.status_id = 25 THEN 'Em Separação'
            WHEN h.status_id = 27 THEN 'Separado'
            WHEN h.status_id = 30 THEN 'Em Conferência'
            WHEN h.status_id = 40 AND COALESCE(CAST(h.cust_field_2 AS VARCHAR), '') <> '' THEN 'Faturado'
            WHEN h.status_id = 40 THEN 'Conferido'
            WHEN h.status_id = 50 THEN 'Carregado'
            WHEN h.status_id = 90 THEN 'Expedido'
            WHEN h.status_id = 99 THEN 'Cancelado'
            ELSE 'Desconhecido'
        END AS status_remessa,
        h.cust_name AS nome_cliente,
        h.cust_addr AS endereco_cliente,
        h.cust_addr2 AS numero_end_cliente,
        h.cust_city AS cidade_cliente,
        h.cust_state AS estado_cliente,
        h.cust_zip AS cep_cliente,
        h.cust_nbr AS cod_cliente,
        h.shipto_name AS cliente_entrega,
        h.shipto_addr AS endereco_entrega,
        h.shipto_addr2 AS numero_entrega,
        h.shipto_city AS cidade_cliente_entrega,
        h.shipto_state AS estado_cliente_entrega,
        h.shipto_zip AS cep_cliente_entrega,
        h.priority AS prioridade,
        CAST(h.order_shipped_ts AS DATE) AS data_expedicao,
        h.cust_field_2 AS nota_fiscal,
        h.cust_date_1 AS dt_faturamento,
        h.cust_short_text_2 AS erro_zero,
        h.cust_long_text_1 AS transportadora,
        h.cust_long_text_2 AS tipo_pedido_extra
    FROM dtl d
    LEFT JOIN hdr h ON d.order_id_id = h.id
    LEFT JOIN st  s ON h.status_id = s.id
    WHERE CAST(h.order_type_id_key AS VARCHAR) <> '91'
";

/// Build the combined orders report from the three exported tables
pub fn combined_orders_report(hdr: &Bytes, dtl: &Bytes, status: &Bytes) -> Result<Bytes> {
    let dir = std::env::temp_dir().join(format!("wms_extract_report_{}", unique_suffix()));
    std::fs::create_dir_all(&dir)?;

    let result = run_report(&dir, hdr, dtl, status);
    let _ = std::fs::remove_dir_all(&dir);
    result
}

fn run_report(dir: &Path, hdr: &Bytes, dtl: &Bytes, status: &Bytes) -> Result<Bytes> {
    let hdr_path = write_table(dir, "order_hdr.csv", hdr)?;
    let dtl_path = write_table(dir, "order_dtl.csv", dtl)?;
    let status_path = write_table(dir, "order_status.csv", status)?;

    let conn = Connection::open_in_memory()
        .map_err(|e| Error::report(format!("Failed to open DuckDB connection: {e}")))?;

    register_view(&conn, "hdr", &hdr_path)?;
    register_view(&conn, "dtl", &dtl_path)?;
    register_view(&conn, "st", &status_path)?;

    let out_path = dir.join("combined.csv");
    let out_str = path_str(&out_path)?;
    let copy_sql = format!("COPY ({REPORT_QUERY}) TO '{out_str}' (FORMAT CSV, HEADER true);");
    conn.execute_batch(&copy_sql)
        .map_err(|e| Error::report(format!("Failed to run combined report: {e}")))?;

    let content = std::fs::read(&out_path)?;
    Ok(Bytes::from(content))
}

fn write_table(dir: &Path, name: &str, content: &Bytes) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}

fn register_view(conn: &Connection, name: &str, path: &Path) -> Result<()> {
    let path_str = path_str(path)?;
    let sql = format!(
        "CREATE VIEW {name} AS SELECT * FROM read_csv_auto('{path_str}', header = true);"
    );
    conn.execute_batch(&sql)
        .map_err(|e| Error::report(format!("Failed to register table '{name}': {e}")))
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::report(format!("Non-UTF-8 temp path: {}", path.display())))
}

fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{timestamp:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::order_dtl::{normalize_order_dtl, FIELDNAMES as DTL_FIELDNAMES};
    use crate::extractors::order_hdr::{normalize_order_hdr, FIELDNAMES as HDR_FIELDNAMES};
    use crate::extractors::order_status::{
        normalize_order_status, FIELDNAMES as STATUS_FIELDNAMES,
    };
    use crate::tabular::csv_fixed;
    use serde_json::json;

    fn sample_tables() -> (Bytes, Bytes, Bytes) {
        let hdr_rows = vec![
            normalize_order_hdr(&json!({
                "id": 1,
                "order_nbr": "R-100",
                "facility_id": {"key": "FAC1"},
                "order_type_id": {"key": "10"},
                "status_id": 40,
                "cust_field_2": "NF-55",
                "cust_name": "Cliente A",
                "ord_date": "2026-08-01",
                "req_ship_date": "2026-08-05",
                "priority": 1
            })),
            normalize_order_hdr(&json!({
                "id": 2,
                "order_nbr": "R-200",
                "facility_id": {"key": "FAC1"},
                "order_type_id": {"key": "91"},
                "status_id": 20
            })),
            normalize_order_hdr(&json!({
                "id": 3,
                "order_nbr": "R-300",
                "facility_id": {"key": "FAC2"},
                "order_type_id": {"key": "10"},
                "status_id": 40
            })),
        ];
        let hdr = csv_fixed(&hdr_rows, &HDR_FIELDNAMES).unwrap();

        let dtl_rows = vec![
            normalize_order_dtl(&json!({
                "id": 11,
                "order_id": {"id": 1, "key": "R-100"},
                "item_id": {"id": 7, "key": "SKU-7"},
                "ord_qty": 5,
                "orig_ord_qty": 5,
                "alloc_qty": 5,
                "create_ts": "2026-08-01T10:30:00",
                "mod_ts": "2026-08-02T11:00:00"
            })),
            normalize_order_dtl(&json!({
                "id": 12,
                "order_id": {"id": 2, "key": "R-200"},
                "item_id": {"id": 8, "key": "SKU-8"},
                "ord_qty": 1,
                "create_ts": "2026-08-01T09:00:00",
                "mod_ts": "2026-08-01T09:00:00"
            })),
            normalize_order_dtl(&json!({
                "id": 13,
                "order_id": {"id": 3, "key": "R-300"},
                "item_id": {"id": 9, "key": "SKU-9"},
                "ord_qty": 2,
                "create_ts": "2026-08-03T08:00:00",
                "mod_ts": "2026-08-03T08:15:00"
            })),
        ];
        let dtl = csv_fixed(&dtl_rows, &DTL_FIELDNAMES).unwrap();

        let status_rows = vec![
            normalize_order_status(&json!({"id": 20, "description": "Allocated"})),
            normalize_order_status(&json!({"id": 40, "description": "Verified"})),
        ];
        let status = csv_fixed(&status_rows, &STATUS_FIELDNAMES).unwrap();

        (hdr, dtl, status)
    }

    #[test]
    fn test_combined_report_joins_and_filters() {
        let (hdr, dtl, status) = sample_tables();
        let combined = combined_orders_report(&hdr, &dtl, &status).unwrap();
        let text = String::from_utf8(combined.to_vec()).unwrap();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("filial,dt_criacao,hr_criacao"));
        assert!(header.contains("status_remessa"));
        assert!(header.contains("tipo_pedido_extra"));

        let rows: Vec<&str> = lines.collect();
        // Order type 91 is excluded
        assert_eq!(rows.len(), 2);
        assert!(!text.contains("R-200"));
        assert!(text.contains("R-100"));
        assert!(text.contains("R-300"));
    }

    #[test]
    fn test_status_translation() {
        let (hdr, dtl, status) = sample_tables();
        let combined = combined_orders_report(&hdr, &dtl, &status).unwrap();
        let text = String::from_utf8(combined.to_vec()).unwrap();

        // status 40 with invoice number set is billed, without it verified
        let billed: Vec<&str> = text.lines().filter(|l| l.contains("R-100")).collect();
        assert_eq!(billed.len(), 1);
        assert!(billed[0].contains("Faturado"));

        let verified: Vec<&str> = text.lines().filter(|l| l.contains("R-300")).collect();
        assert_eq!(verified.len(), 1);
        assert!(verified[0].contains("Conferido"));
    }
}
