//! Container extractor: dynamic-header CSV of flattened records

use super::Artifact;
use crate::error::Result;
use crate::tabular::{csv_dynamic, flatten_one_level};
use crate::wms::WmsClient;

pub async fn extract_container(
    client: &WmsClient,
    limit_pages: Option<u32>,
) -> Result<Artifact> {
    let items = client.fetch_all_limited("container", limit_pages).await?;
    let flattened: Vec<_> = items.iter().map(flatten_one_level).collect();
    let (_, content) = csv_dynamic(&flattened)?;
    Ok(Artifact::new("container.csv", content))
}
