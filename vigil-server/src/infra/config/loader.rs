use std::path::PathBuf;

use url::Url;

use super::sources::{EnvConfig, FileConfig};
use super::{
    AlertsConfig, AuthConfig, Config, ConfigMetadata, CorsConfig,
    DatabaseConfig, ServerConfig, WatchConfig, defaults,
};

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    fn push_with_hint(
        &mut self,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

/// Merges the optional TOML file with the environment; environment wins.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: Option<PathBuf>) -> Self {
        self.file_path = path;
        self
    }

    pub fn load(self) -> anyhow::Result<ConfigLoad> {
        let mut warnings = ConfigWarnings::default();

        let env_file_loaded = dotenvy::dotenv().is_ok();

        let file = match &self.file_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!(
                        "failed to read config file {}: {e}",
                        path.display()
                    )
                })?;
                toml::from_str::<FileConfig>(&raw).map_err(|e| {
                    anyhow::anyhow!(
                        "failed to parse config file {}: {e}",
                        path.display()
                    )
                })?
            }
            None => FileConfig::default(),
        };

        let env = EnvConfig::gather();

        let engine_url = parse_url_option(
            env.alert_engine_url.or(file.alerts.engine_url),
            "ALERT_ENGINE_URL",
            &mut warnings,
        );
        if engine_url.is_none() {
            warnings.push_with_hint(
                "alert engine URL not configured; listing requests will never trigger a scan",
                "set ALERT_ENGINE_URL to enable the refresh gate",
            );
        }

        let fiscal_agent_url = parse_url_option(
            env.fiscal_agent_url.or(file.watch.fiscal_agent_url),
            "FISCAL_AGENT_URL",
            &mut warnings,
        );
        if fiscal_agent_url.is_none() {
            warnings.push(
                "fiscal agent URL not configured; watch analysis is disabled",
            );
        }

        let refresh_ttl_seconds = env
            .alert_refresh_ttl
            .or(file.alerts.refresh_ttl_seconds)
            .unwrap_or(defaults::ALERT_REFRESH_TTL);
        if refresh_ttl_seconds < 0 {
            anyhow::bail!("ALERT_REFRESH_TTL must be non-negative");
        }

        let token_key = match env.auth_token_key.or(file.auth.token_key) {
            Some(key) => key,
            None => {
                warnings.push_with_hint(
                    "AUTH_TOKEN_KEY not set, using the development signing key",
                    "set AUTH_TOKEN_KEY before exposing this server",
                );
                defaults::DEV_TOKEN_KEY.to_string()
            }
        };

        let config = Config {
            server: ServerConfig {
                host: env
                    .server_host
                    .or(file.server.host)
                    .unwrap_or_else(|| defaults::SERVER_HOST.to_string()),
                port: env
                    .server_port
                    .or(file.server.port)
                    .unwrap_or(defaults::SERVER_PORT),
            },
            database: DatabaseConfig {
                url: env.database_url.or(file.database.url),
            },
            alerts: AlertsConfig {
                engine_url,
                refresh_ttl_seconds,
                call_timeout_seconds: env
                    .call_timeout_seconds
                    .or(file.alerts.call_timeout_seconds)
                    .unwrap_or(defaults::CALL_TIMEOUT_SECONDS),
                max_alerts: env
                    .max_alerts
                    .or(file.alerts.max_alerts)
                    .unwrap_or(defaults::MAX_ALERTS),
                service_account_json: env.engine_service_account_json,
            },
            watch: WatchConfig {
                fiscal_agent_url,
                call_timeout_seconds: defaults::CALL_TIMEOUT_SECONDS,
            },
            auth: AuthConfig {
                token_key,
                token_ttl_seconds: env
                    .auth_token_ttl_seconds
                    .or(file.auth.token_ttl_seconds)
                    .unwrap_or(defaults::AUTH_TOKEN_TTL_SECONDS),
            },
            cors: CorsConfig {
                allowed_origins: env
                    .cors_allowed_origins
                    .or(file.cors.allowed_origins)
                    .unwrap_or_default(),
            },
            dev_mode: env.dev_mode.or(file.dev_mode).unwrap_or(false),
            metadata: ConfigMetadata {
                env_file_loaded,
                file_path: self.file_path,
            },
        };

        Ok(ConfigLoad { config, warnings })
    }
}

fn parse_url_option(
    raw: Option<String>,
    option_name: &str,
    warnings: &mut ConfigWarnings,
) -> Option<Url> {
    let raw = raw?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(err) => {
            warnings.push(format!("{option_name} is not a valid URL: {err}"));
            None
        }
    }
}
