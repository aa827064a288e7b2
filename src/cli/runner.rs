//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::AppConfig;
use crate::database::SqlRunner;
use crate::drive::DriveClient;
use crate::error::{Error, Result};
use crate::extractors::{
    extract_container, extract_inventory, extract_order_dtl, extract_order_hdr,
    extract_order_status, Artifact,
};
use crate::report::{combined_orders_report, COMBINED_REPORT_NAME};
use crate::wms::WmsClient;
use std::path::Path;
use std::time::Instant;
use tracing::info;

const ALL_ENTITIES: [&str; 5] = [
    "container",
    "inventory",
    "order_hdr",
    "order_dtl",
    "order_status",
];

/// The order tables feed the combined report and are not published on
/// their own.
const REPORT_INPUT_FILES: [&str; 3] = ["order_hdr.csv", "order_dtl.csv", "order_status.csv"];

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Extract {
                entities,
                output,
                limit_pages,
            } => {
                self.extract(entities.as_deref(), output.as_deref(), *limit_pages)
                    .await
            }
            Commands::Db { output } => self.db(output.as_deref()).await,
            Commands::Check { entity } => self.check(entity).await,
        }
    }

    async fn extract(
        &self,
        entities: Option<&str>,
        output: Option<&Path>,
        limit_pages: Option<u32>,
    ) -> Result<()> {
        let config = self.load_config()?;
        config.validate_wms()?;
        let client = WmsClient::new(config.wms.clone())?;

        let selected = selected_entities(entities)?;
        let mut artifacts = Vec::with_capacity(selected.len() + 1);
        for entity in &selected {
            let started = Instant::now();
            let artifact = match *entity {
                "container" => extract_container(&client, limit_pages).await?,
                "inventory" => extract_inventory(&client, limit_pages).await?,
                "order_hdr" => extract_order_hdr(&client, limit_pages).await?,
                "order_dtl" => extract_order_dtl(&client, limit_pages).await?,
                "order_status" => extract_order_status(&client, limit_pages).await?,
                other => return Err(Error::config(format!("Unknown entity: {other}"))),
            };
            info!(
                entity,
                bytes = artifact.content.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "Extraction finished"
            );
            artifacts.push(artifact);
        }

        if let Some(combined) = self.build_combined_report(&artifacts)? {
            artifacts.push(combined);
        }

        self.publish(&config, artifacts, output, true).await
    }

    /// Build the combined report when all three order tables were extracted.
    fn build_combined_report(&self, artifacts: &[Artifact]) -> Result<Option<Artifact>> {
        let find = |name: &str| artifacts.iter().find(|a| a.name == name);
        let (Some(hdr), Some(dtl), Some(status)) = (
            find("order_hdr.csv"),
            find("order_dtl.csv"),
            find("order_status.csv"),
        ) else {
            return Ok(None);
        };

        let content = combined_orders_report(&hdr.content, &dtl.content, &status.content)?;
        info!(bytes = content.len(), "Combined orders report built");
        Ok(Some(Artifact::new(COMBINED_REPORT_NAME, content)))
    }

    async fn db(&self, output: Option<&Path>) -> Result<()> {
        let config = self.load_config()?;
        if config.database.scripts.is_empty() {
            return Err(Error::config("No SQL scripts configured"));
        }

        let runner = SqlRunner::connect(&config.database)?;
        let mut artifacts = Vec::with_capacity(config.database.scripts.len());
        for script in &config.database.scripts {
            let content = runner.run_script(Path::new(&script.sql_file))?;
            info!(
                script = %script.sql_file,
                output = %script.output_csv,
                bytes = content.len(),
                "SQL script finished"
            );
            artifacts.push(Artifact::new(script.output_csv.clone(), content));
        }

        self.publish(&config, artifacts, output, false).await
    }

    async fn check(&self, entity: &str) -> Result<()> {
        let config = self.load_config()?;
        config.validate_wms()?;
        let client = WmsClient::new(config.wms.clone())?;

        let pages = client.check(entity).await?;
        info!(entity, pages, "Connection check succeeded");
        println!("{entity}: {pages} page(s)");
        Ok(())
    }

    fn load_config(&self) -> Result<AppConfig> {
        AppConfig::load(&self.cli.config)
    }

    /// Write artifacts locally or upload them to Drive.
    ///
    /// When publishing to Drive, `skip_report_inputs` leaves out the raw
    /// order tables; only their combined report is of interest there. Local
    /// output keeps everything for inspection.
    async fn publish(
        &self,
        config: &AppConfig,
        artifacts: Vec<Artifact>,
        output: Option<&Path>,
        skip_report_inputs: bool,
    ) -> Result<()> {
        if let Some(dir) = output {
            std::fs::create_dir_all(dir)?;
            for artifact in &artifacts {
                let path = dir.join(&artifact.name);
                std::fs::write(&path, &artifact.content)?;
                info!(path = %path.display(), "Artifact written");
            }
            return Ok(());
        }

        let drive = DriveClient::connect(&config.drive).await?;
        for artifact in &artifacts {
            if skip_report_inputs && REPORT_INPUT_FILES.contains(&artifact.name.as_str()) {
                continue;
            }
            let id = drive.upload_or_update(&config.drive, artifact).await?;
            info!(name = %artifact.name, id, "Artifact published");
        }
        Ok(())
    }
}

fn selected_entities(entities: Option<&str>) -> Result<Vec<&'static str>> {
    let Some(requested) = entities else {
        return Ok(ALL_ENTITIES.to_vec());
    };

    let mut selected = Vec::new();
    for name in requested.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let known = ALL_ENTITIES
            .iter()
            .find(|&&e| e == name)
            .ok_or_else(|| Error::config(format!("Unknown entity: {name}")))?;
        selected.push(*known);
    }
    if selected.is_empty() {
        return Err(Error::config("No entities selected"));
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_entities_defaults_to_all() {
        assert_eq!(selected_entities(None).unwrap(), ALL_ENTITIES.to_vec());
    }

    #[test]
    fn test_selected_entities_parses_list() {
        let selected = selected_entities(Some("container, order_status")).unwrap();
        assert_eq!(selected, vec!["container", "order_status"]);
    }

    #[test]
    fn test_selected_entities_rejects_unknown() {
        assert!(selected_entities(Some("container,nope")).is_err());
    }

    #[test]
    fn test_selected_entities_rejects_empty_list() {
        assert!(selected_entities(Some(" , ")).is_err());
    }
}
