use serde::Deserialize;

use crate::models::image_content_type;

/// Env var that overrides `auth.api_key` from the config file.
pub const API_KEY_ENV: &str = "API_SECRET_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
}

fn default_max_pool_size() -> u32 {
    5
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected in the `X-API-Key` header.
    #[serde(default)]
    pub api_key: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Reject uploads without an `image_file` part.
    pub require_image: bool,
    /// Request body limit for `POST /upload`.
    pub max_body_bytes: usize,
    /// Stored when the image part declares no content type, or one that is not a servable image type.
    pub default_content_type: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            require_image: true,
            max_body_bytes: 16 * 1024 * 1024,
            default_content_type: "image/png".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_per_page: u32,
    /// Hard cap for `per_page` and `last_n`.
    pub max_per_page: u32,
    /// Max number of `id` parameters in one `/data` request.
    pub max_ids: usize,
    /// When set, `/data` without any selector (id, last_n, id range, page) is a client error.
    pub require_selector: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 100,
            max_ids: 500,
            require_selector: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        let api_key = std::env::var(API_KEY_ENV).ok();
        Self::load_with_key_override(&s, api_key)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        Self::load_with_key_override(s, None)
    }

    /// Parse config; a non-empty `api_key` replaces `auth.api_key` before validation.
    pub fn load_with_key_override(s: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            config.auth.api_key = key;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            !self.auth.api_key.trim().is_empty(),
            "auth.api_key must be set (or provide {})",
            API_KEY_ENV
        );
        anyhow::ensure!(
            self.upload.max_body_bytes > 0,
            "upload.max_body_bytes must be > 0, got {}",
            self.upload.max_body_bytes
        );
        anyhow::ensure!(
            image_content_type(&self.upload.default_content_type).is_some(),
            "upload.default_content_type must be a non-SVG image/* type, got {:?}",
            self.upload.default_content_type
        );
        anyhow::ensure!(
            self.query.max_per_page > 0,
            "query.max_per_page must be > 0, got {}",
            self.query.max_per_page
        );
        anyhow::ensure!(
            self.query.default_per_page > 0
                && self.query.default_per_page <= self.query.max_per_page,
            "query.default_per_page must be in 1..={}, got {}",
            self.query.max_per_page,
            self.query.default_per_page
        );
        anyhow::ensure!(
            self.query.max_ids > 0,
            "query.max_ids must be > 0, got {}",
            self.query.max_ids
        );
        Ok(())
    }
}
