pub mod loader;
pub mod sources;

use url::Url;

pub use loader::{ConfigLoad, ConfigLoader, ConfigWarning, ConfigWarnings};
pub use sources::{EnvConfig, FileConfig};

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub alerts: AlertsConfig,
    pub watch: WatchConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

/// Alert module settings, all overridable from the environment.
#[derive(Debug, Clone)]
pub struct AlertsConfig {
    /// Dispatch target for engine scans; the refresh gate is disabled when
    /// this is unset.
    pub engine_url: Option<Url>,
    pub refresh_ttl_seconds: i64,
    pub call_timeout_seconds: u64,
    pub max_alerts: i64,
    /// Key material for the first tier of the engine credential chain.
    pub service_account_json: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub fiscal_agent_url: Option<Url>,
    pub call_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_key: String,
    pub token_ttl_seconds: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub env_file_loaded: bool,
    pub file_path: Option<std::path::PathBuf>,
}

pub mod defaults {
    pub const SERVER_HOST: &str = "0.0.0.0";
    pub const SERVER_PORT: u16 = 8080;
    pub const ALERT_REFRESH_TTL: i64 = 300;
    pub const CALL_TIMEOUT_SECONDS: u64 = 30;
    pub const MAX_ALERTS: i64 = 50;
    pub const AUTH_TOKEN_TTL_SECONDS: i64 = 86_400;
    /// Placeholder signing key for development; flagged by the loader so it
    /// never silently reaches production.
    pub const DEV_TOKEN_KEY: &str = "vigil-dev-insecure-token-key";
}
