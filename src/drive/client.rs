//! Drive REST client

use super::auth;
use crate::config::DriveConfig;
use crate::error::{Error, Result};
use crate::extractors::Artifact;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";
const MULTIPART_BOUNDARY: &str = "wms_extract_upload_boundary";

/// Authenticated client for the Drive v3 files API.
pub struct DriveClient {
    http: Client,
    token: String,
    base_url: String,
}

/// File identity as returned by the files listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

impl DriveClient {
    /// Resolve credentials and build a ready-to-use client.
    pub async fn connect(config: &DriveConfig) -> Result<Self> {
        let http = Client::new();
        let token = auth::access_token(&http, config).await?;
        Ok(Self {
            http,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Build a client against a custom endpoint with a pre-issued token.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token: token.into(),
            base_url: base_url.into(),
        }
    }

    /// Look up a non-trashed file by exact name within a folder.
    pub async fn find_file(
        &self,
        file_name: &str,
        folder_id: &str,
        shared_drive_id: Option<&str>,
    ) -> Result<Option<DriveFile>> {
        let escaped = file_name.replace('\'', "\\'");
        let query = format!("name = '{escaped}' and '{folder_id}' in parents and trashed = false");

        let mut params = vec![
            ("q", query),
            ("spaces", "drive".to_string()),
            ("fields", "files(id, name)".to_string()),
            ("supportsAllDrives", "true".to_string()),
        ];
        if let Some(drive_id) = shared_drive_id {
            params.push(("corpora", "drive".to_string()));
            params.push(("driveId", drive_id.to_string()));
            params.push(("includeItemsFromAllDrives", "true".to_string()));
        }

        let response = self
            .http
            .get(format!("{}/drive/v3/files", self.base_url))
            .query(&params)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let list: FileList = response.json().await?;
        Ok(list.files.into_iter().next())
    }

    /// Publish an artifact into the configured folder.
    ///
    /// An existing file with the same name gets its content replaced in
    /// place, which keeps its id and any links to it stable. Otherwise a
    /// new file is created in the folder.
    pub async fn upload_or_update(
        &self,
        config: &DriveConfig,
        artifact: &Artifact,
    ) -> Result<String> {
        let existing = self
            .find_file(
                &artifact.name,
                &config.folder_id,
                config.shared_drive_id.as_deref(),
            )
            .await?;

        match existing {
            Some(file) => {
                info!(name = %artifact.name, id = %file.id, "Updating existing Drive file");
                self.update_content(&file.id, artifact).await
            }
            None => {
                info!(name = %artifact.name, folder = %config.folder_id, "Creating Drive file");
                self.create_file(&config.folder_id, artifact).await
            }
        }
    }

    async fn update_content(&self, file_id: &str, artifact: &Artifact) -> Result<String> {
        let response = self
            .http
            .patch(format!(
                "{}/upload/drive/v3/files/{file_id}?uploadType=media&supportsAllDrives=true",
                self.base_url
            ))
            .bearer_auth(&self.token)
            .header("Content-Type", "text/csv")
            .body(artifact.content.clone())
            .send()
            .await?;

        self.uploaded_id(response, &artifact.name).await
    }

    async fn create_file(&self, folder_id: &str, artifact: &Artifact) -> Result<String> {
        let metadata = serde_json::json!({
            "name": artifact.name,
            "parents": [folder_id],
        });
        let body = multipart_related(&metadata.to_string(), &artifact.content);

        let response = self
            .http
            .post(format!(
                "{}/upload/drive/v3/files?uploadType=multipart&supportsAllDrives=true",
                self.base_url
            ))
            .bearer_auth(&self.token)
            .header(
                "Content-Type",
                format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(body)
            .send()
            .await?;

        self.uploaded_id(response, &artifact.name).await
    }

    async fn uploaded_id(&self, response: reqwest::Response, name: &str) -> Result<String> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::drive_upload(
                name,
                format!("Upload failed with status {status}: {body}"),
            ));
        }

        #[derive(Deserialize)]
        struct Uploaded {
            id: String,
        }
        let uploaded: Uploaded = response.json().await?;
        Ok(uploaded.id)
    }
}

/// Assemble a multipart/related body: JSON metadata part, then the content.
fn multipart_related(metadata: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{MULTIPART_BOUNDARY}\r\nContent-Type: text/csv\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
