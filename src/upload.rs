use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::api::{error_message, join_path};
use crate::config::AppConfig;
use crate::error::AdminError;

/// Unsigned image uploads to the asset host. The returned URL is what
/// gets stored in a record's image field.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    client: Client,
    endpoint: Url,
    upload_preset: String,
}

impl ImageUploader {
    pub fn new(
        base_url: &str,
        cloud_name: &str,
        upload_preset: &str,
        timeout: Duration,
    ) -> Result<Self, AdminError> {
        let base = Url::parse(base_url)
            .map_err(|e| AdminError::invalid_state(format!("invalid upload URL '{}': {}", base_url, e)))?;
        let endpoint = join_path(&base, &format!("/v1_1/{}/image/upload", cloud_name))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            upload_preset: upload_preset.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AdminError> {
        Self::new(
            &config.upload.base_url,
            &config.upload.cloud_name,
            &config.upload.upload_preset,
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn upload_file(&self, path: &Path) -> Result<String, AdminError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AdminError::Storage(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        self.upload_bytes(bytes, &file_name).await
    }

    pub async fn upload_bytes(&self, bytes: Vec<u8>, file_name: &str) -> Result<String, AdminError> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AdminError::from_status(status.as_u16(), error_message(&text)));
        }

        let body: Value = serde_json::from_str(&text)?;
        let url = ["secure_url", "url"]
            .iter()
            .find_map(|k| body.get(*k).and_then(Value::as_str))
            .ok_or_else(|| AdminError::Decode("upload response has no URL".to_string()))?;

        info!("Uploaded {} to {}", file_name, url);
        Ok(url.to_string())
    }
}
