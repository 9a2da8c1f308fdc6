use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::api::{error_message, join_path};
use crate::config::AppConfig;
use crate::error::AdminError;
use crate::storage::{LocalStorage, StorageError, KEY_AUTHENTICATED, KEY_TOKEN, KEY_USER_ROLE};

const LOGIN_PATH: &str = "/api/admin/login";
const FALLBACK_TOKEN: &str = "authenticated";
const DEFAULT_ROLE: &str = "admin";

/// Authentication state as persisted in local storage.
///
/// The presence of the flag and a token is the whole trust decision; there
/// is no expiry and nothing is verified.
#[derive(Debug, Clone)]
pub struct Session {
    storage: LocalStorage,
}

impl Session {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(LocalStorage::open_default()?))
    }

    pub fn is_authenticated(&self) -> bool {
        self.storage.get(KEY_AUTHENTICATED) == Some("true")
            && self.token().is_some_and(|t| !t.is_empty())
    }

    pub fn token(&self) -> Option<&str> {
        self.storage.get(KEY_TOKEN)
    }

    pub fn role(&self) -> Option<&str> {
        self.storage.get(KEY_USER_ROLE)
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Persist a successful login
    pub fn store(&mut self, grant: &LoginGrant) -> Result<(), StorageError> {
        self.storage.set(KEY_AUTHENTICATED, "true")?;
        self.storage.set(KEY_TOKEN, grant.token.as_str())?;
        self.storage.set(KEY_USER_ROLE, grant.role.as_str())?;
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.storage.remove(KEY_AUTHENTICATED)?;
        self.storage.remove(KEY_TOKEN)?;
        self.storage.remove(KEY_USER_ROLE)?;
        info!("Session cleared");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    pub role: String,
}

impl LoginGrant {
    /// Read token and role from a login response, whatever nesting it uses
    pub fn from_response(body: &Value) -> Self {
        let lookup = |key: &str| -> Option<String> {
            [
                body.get(key),
                body.get("data").and_then(|d| d.get(key)),
                body.get("user").and_then(|u| u.get(key)),
                body.get("data").and_then(|d| d.get("user")).and_then(|u| u.get(key)),
            ]
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string))
        };

        Self {
            token: lookup("token").unwrap_or_else(|| FALLBACK_TOKEN.to_string()),
            role: lookup("role").unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        }
    }
}

/// Client for the separate admin-auth host
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: Url,
}

impl AuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AdminError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AdminError::invalid_state(format!("invalid auth base URL '{}': {}", base_url, e)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AdminError> {
        Self::new(&config.api.auth_base_url, Duration::from_secs(config.api.timeout_secs))
    }

    pub fn login_url(&self) -> Result<Url, AdminError> {
        join_path(&self.base_url, LOGIN_PATH)
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> Result<LoginGrant, AdminError> {
        let url = self.login_url()?;

        let response = self.client.post(url).json(credentials).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AdminError::from_status(status.as_u16(), error_message(&text)));
        }

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok(LoginGrant::from_response(&body))
    }
}

/// Authenticate and persist the result. Nothing is stored on failure.
pub async fn login(
    session: &mut Session,
    auth: &AuthClient,
    credentials: &Credentials,
) -> Result<LoginGrant, AdminError> {
    match auth.authenticate(credentials).await {
        Ok(grant) => {
            session.store(&grant)?;
            info!("Logged in as {} ({})", credentials.email, grant.role);
            Ok(grant)
        }
        Err(e) => {
            warn!("Login failed for {}: {}", credentials.email, e);
            Err(e)
        }
    }
}
