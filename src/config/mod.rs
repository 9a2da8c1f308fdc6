use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub upload: UploadConfig,
    pub locale: LocaleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Data API host, every resource path is appended to this
    pub base_url: String,
    /// Separate host serving the admin login endpoint
    pub auth_base_url: String,
    pub timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Offset from UTC applied when turning stored timestamps into form dates
    pub tz_offset_minutes: i32,
}

impl Environment {
    pub fn name(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DEALER_API_BASE_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("DEALER_AUTH_BASE_URL") {
            self.api.auth_base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("DEALER_HTTP_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("DEALER_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        if let Ok(v) = env::var("DEALER_UPLOAD_BASE_URL") {
            self.upload.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("DEALER_UPLOAD_CLOUD_NAME") {
            self.upload.cloud_name = v;
        }
        if let Ok(v) = env::var("DEALER_UPLOAD_PRESET") {
            self.upload.upload_preset = v;
        }

        if let Ok(v) = env::var("DEALER_TZ_OFFSET_MINUTES") {
            self.locale.tz_offset_minutes = v.parse().unwrap_or(self.locale.tz_offset_minutes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
                auth_base_url: "http://localhost:5001".to_string(),
                timeout_secs: 30,
                enable_request_logging: true,
            },
            upload: Self::default_upload(),
            locale: LocaleConfig { tz_offset_minutes: 330 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://dataentry-one.vercel.app".to_string(),
                auth_base_url: "https://admin-auth.vercel.app".to_string(),
                timeout_secs: 20,
                enable_request_logging: true,
            },
            upload: Self::default_upload(),
            locale: LocaleConfig { tz_offset_minutes: 330 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://dataentry-one.vercel.app".to_string(),
                auth_base_url: "https://admin-auth.vercel.app".to_string(),
                timeout_secs: 15,
                enable_request_logging: false,
            },
            upload: Self::default_upload(),
            locale: LocaleConfig { tz_offset_minutes: 330 },
        }
    }

    fn default_upload() -> UploadConfig {
        UploadConfig {
            base_url: "https://api.cloudinary.com".to_string(),
            cloud_name: "dealer".to_string(),
            upload_preset: "unsigned_uploads".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
