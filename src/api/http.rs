use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::{error_message, extract_records, join_path, Backend};
use crate::catalog::{Record, Resource};
use crate::config::AppConfig;
use crate::error::AdminError;

/// `Backend` over the data API with plain JSON requests
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    log_requests: bool,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AdminError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AdminError::invalid_state(format!("invalid API base URL '{}': {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AdminError::from)?;
        Ok(Self {
            client,
            base_url,
            log_requests: false,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AdminError> {
        let mut backend = Self::new(&config.api.base_url, Duration::from_secs(config.api.timeout_secs))?;
        backend.log_requests = config.api.enable_request_logging;
        Ok(backend)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self, resource: &Resource) -> Result<Url, AdminError> {
        join_path(&self.base_url, resource.path)
    }

    fn member_url(&self, resource: &Resource, id: &str) -> Result<Url, AdminError> {
        let mut url = self.collection_url(resource)?;
        url.path_segments_mut()
            .map_err(|_| AdminError::invalid_state(format!("'{}' cannot carry a record id", self.base_url)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Response, AdminError> {
        if self.log_requests {
            info!("{} {}", method, url);
        } else {
            debug!("{} {}", method, url);
        }

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        check_status(response).await
    }
}

/// Turn non-2xx responses into errors carrying the server's message
async fn check_status(response: Response) -> Result<Response, AdminError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(AdminError::from_status(status.as_u16(), error_message(&text)))
}

/// JSON body of a write response; an empty body counts as `null`
async fn json_or_null(response: Response) -> Result<Value, AdminError> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list(&self, resource: &Resource) -> Result<Vec<Record>, AdminError> {
        let url = self.collection_url(resource)?;
        let response = self.send(Method::GET, url, None).await?;
        let body: Value = response.json().await?;
        extract_records(body)
    }

    async fn create(&self, resource: &Resource, body: &Value) -> Result<Value, AdminError> {
        let url = self.collection_url(resource)?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        json_or_null(response).await
    }

    async fn update(&self, resource: &Resource, id: &str, body: &Value) -> Result<Value, AdminError> {
        let url = self.member_url(resource, id)?;
        let response = self.send(Method::PUT, url, Some(body)).await?;
        json_or_null(response).await
    }

    async fn delete(&self, resource: &Resource, id: &str) -> Result<(), AdminError> {
        let url = self.member_url(resource, id)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }
}
