//! Integration tests using a mock WMS server
//!
//! Exercises the full flow: config file → paginated extraction → CSV
//! artifacts → combined report, through the CLI runner in local output mode.

use clap::Parser;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wms_extract::cli::{Cli, Runner};

fn entity_path(entity: &str) -> String {
    format!("/wms/lgfapi/v10/entity/{entity}")
}

async fn mount_single_page(server: &MockServer, entity: &str, results: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(entity_path(entity)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page_count": 1,
            "results": results
        })))
        .mount(server)
        .await;
}

fn write_config(dir: &tempfile::TempDir, base_url: &str) -> std::path::PathBuf {
    let config_path = dir.path().join("config.json");
    let config = json!({
        "wms": {
            "base_url": base_url,
            "username": "svc",
            "password": "secret",
            "concurrency": 4,
            "retries": 1,
            "backoff_base": 0.01
        }
    });
    std::fs::write(&config_path, config.to_string()).unwrap();
    config_path
}

fn run_args(config: &std::path::Path, out: &std::path::Path, rest: &[&str]) -> Cli {
    let mut args = vec![
        "wms-extract".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "extract".to_string(),
        "--output".to_string(),
        out.display().to_string(),
    ];
    args.extend(rest.iter().map(ToString::to_string));
    Cli::parse_from(args)
}

#[tokio::test]
async fn test_extract_single_entity_to_local_dir() {
    let server = MockServer::start().await;
    mount_single_page(
        &server,
        "container",
        json!([
            {"container_nbr": "C1", "facility_id": {"key": "FAC1"}},
            {"container_nbr": "C2", "facility_id": {"key": "FAC1"}}
        ]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());
    let out_dir = dir.path().join("out");

    let cli = run_args(&config_path, &out_dir, &["--entities", "container"]);
    Runner::new(cli).run().await.unwrap();

    let csv = std::fs::read_to_string(out_dir.join("container.csv")).unwrap();
    assert_eq!(csv, "container_nbr,facility_id.key\nC1,FAC1\nC2,FAC1\n");
}

#[tokio::test]
async fn test_extract_orders_builds_combined_report() {
    let server = MockServer::start().await;

    mount_single_page(
        &server,
        "order_hdr",
        json!([{
            "id": 1,
            "order_nbr": "R-100",
            "facility_id": {"id": 3, "key": "FAC1"},
            "order_type_id": {"id": 4, "key": "10"},
            "status_id": 90,
            "cust_name": "Cliente A",
            "ord_date": "2026-08-01",
            "order_shipped_ts": "2026-08-10T16:00:00"
        }]),
    )
    .await;
    mount_single_page(
        &server,
        "order_dtl",
        json!([{
            "id": 11,
            "order_id": {"id": 1, "key": "R-100"},
            "item_id": {"id": 7, "key": "SKU-7"},
            "ord_qty": 5,
            "alloc_qty": 5,
            "create_ts": "2026-08-01T10:30:00",
            "mod_ts": "2026-08-02T11:00:00"
        }]),
    )
    .await;
    mount_single_page(
        &server,
        "order_status",
        json!([
            {"id": 0, "description": "Created"},
            {"id": 90, "description": "Shipped"}
        ]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());
    let out_dir = dir.path().join("out");

    let cli = run_args(
        &config_path,
        &out_dir,
        &["--entities", "order_hdr,order_dtl,order_status"],
    );
    Runner::new(cli).run().await.unwrap();

    // Raw tables land locally alongside the combined report
    assert!(out_dir.join("order_hdr.csv").is_file());
    assert!(out_dir.join("order_dtl.csv").is_file());
    assert!(out_dir.join("order_status.csv").is_file());

    let combined =
        std::fs::read_to_string(out_dir.join("base_status_pedidos_wms_sae.csv")).unwrap();
    let mut lines = combined.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("filial,"));
    assert!(header.contains("remessa"));
    assert!(header.contains("status_remessa"));

    let row = lines.next().unwrap();
    assert!(row.contains("R-100"));
    assert!(row.contains("SKU-7"));
    assert!(row.contains("Expedido"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_extract_survives_dropped_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(entity_path("order_status")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(entity_path("order_status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page_count": 2,
            "results": [{"id": 0, "description": "Created"}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());
    let out_dir = dir.path().join("out");

    let cli = run_args(&config_path, &out_dir, &["--entities", "order_status"]);
    Runner::new(cli).run().await.unwrap();

    // Page 2 is dropped after exhausting retries; page 1 still lands
    let csv = std::fs::read_to_string(out_dir.join("order_status.csv")).unwrap();
    assert_eq!(csv, "id,description\n0,Created\n");
}

#[tokio::test]
async fn test_extract_unknown_entity_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, "http://localhost:1");
    let out_dir = dir.path().join("out");

    let cli = run_args(&config_path, &out_dir, &["--entities", "warehouse"]);
    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(err.to_string().contains("warehouse"));
}

#[tokio::test]
async fn test_extract_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");

    let cli = run_args(
        &dir.path().join("nope.json"),
        &out_dir,
        &["--entities", "container"],
    );
    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(matches!(err, wms_extract::Error::FileNotFound { .. }));
}
