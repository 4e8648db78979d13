use std::env;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::auth::errors::AppIdError;
use crate::domain::auth::models::App;
use crate::domain::auth::models::AppId;
use crate::domain::auth::models::AppLookupPolicy;
use crate::domain::auth::models::AppSecret;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub env: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub token: TokenConfig,
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub apps: Vec<AppConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub grpc_port: u16,
    pub grpc_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    pub ttl_secs: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoginConfig {
    #[serde(default)]
    pub app_lookup_policy: AppLookupPolicy,
}

/// Client app provisioned at startup.
#[derive(Deserialize, Clone)]
pub struct AppConfig {
    pub id: i32,
    pub name: String,
    pub secret: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl AppConfig {
    pub fn to_app(&self) -> Result<App, AppIdError> {
        Ok(App {
            id: AppId::new(self.id)?,
            name: self.name.clone(),
            secret: AppSecret::new(self.secret.as_bytes()),
        })
    }
}

impl DatabaseConfig {
    /// Directory holding the database file, if the URL names one.
    pub fn storage_dir(&self) -> Option<PathBuf> {
        let path = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or(path);

        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }

        Path::new(path)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

impl ServerConfig {
    pub fn grpc_timeout(&self) -> Duration {
        Duration::from_millis(self.grpc_timeout_ms)
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SSO_DATABASE__URL, SSO_TOKEN__TTL_SECS, etc.)
    /// 2. File named by CONFIG_PATH, if set
    /// 3. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 4. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "local".to_string());

        let mut builder = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        if let Ok(path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&path));
        }

        let configuration = builder
            .add_source(
                Environment::with_prefix("SSO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        if config.token.ttl_secs < 1 {
            return Err(ConfigError::Message(format!(
                "token.ttl_secs must be at least 1, got {}",
                config.token.ttl_secs
            )));
        }

        Ok(config)
    }

    /// Default log filter for this deployment environment.
    pub fn default_log_filter(&self) -> &'static str {
        match self.env.as_str() {
            "prod" => "sso_service=info,tower_http=info",
            _ => "sso_service=debug,tower_http=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    const SAMPLE: &str = r#"
        env = "dev"

        [database]
        url = "sqlite://storage/sso.db"
        max_connections = 5

        [server]
        http_port = 8080
        grpc_port = 44044
        grpc_timeout_ms = 10000

        [store]
        timeout_ms = 2000

        [token]
        ttl_secs = 3600

        [[apps]]
        id = 1
        name = "test"
        secret = "test-secret"
    "#;

    fn parse(source: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let config = parse(SAMPLE);

        assert_eq!(config.token.ttl_secs, 3600);
        assert_eq!(config.store.timeout(), Duration::from_secs(2));
        assert_eq!(config.login.app_lookup_policy, AppLookupPolicy::Conceal);
        assert_eq!(config.apps.len(), 1);

        let app = config.apps[0].to_app().unwrap();
        assert_eq!(app.id, AppId(1));
        assert_eq!(app.secret.as_bytes(), b"test-secret");
    }

    #[test]
    fn test_reveal_policy() {
        let config = parse(&format!("{SAMPLE}\n[login]\napp_lookup_policy = \"reveal\"\n"));
        assert_eq!(config.login.app_lookup_policy, AppLookupPolicy::Reveal);
    }

    #[test]
    fn test_app_secret_is_redacted() {
        let config = parse(SAMPLE);
        assert!(!format!("{:?}", config.apps[0]).contains("test-secret"));
    }

    #[test]
    fn test_storage_dir() {
        let database = |url: &str| DatabaseConfig {
            url: url.to_string(),
            max_connections: 1,
        };

        assert_eq!(
            database("sqlite://storage/sso.db").storage_dir(),
            Some(PathBuf::from("storage"))
        );
        assert_eq!(
            database("sqlite://storage/sso.db?mode=rwc").storage_dir(),
            Some(PathBuf::from("storage"))
        );
        assert_eq!(database("sqlite://sso.db").storage_dir(), None);
        assert_eq!(database("sqlite::memory:").storage_dir(), None);
    }
}
