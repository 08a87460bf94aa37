use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vigil_core::auth::AuthService;
use vigil_core::engine::{CredentialChain, EngineClient};
use vigil_core::refresh::{RefreshGate, ScanDispatcher};
use vigil_core::store::Store;
use vigil_core::watch::WatchAnalyzer;
use vigil_core::agents::FiscalAgentClient;

use vigil_server::{
    AppState, create_app,
    infra::config::{Config, ConfigLoad, ConfigLoader},
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "vigil-server")]
#[command(
    about = "Backend-for-frontend for regulatory alerts, compliance tasks, and filing workflows"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long, env = "VIGIL_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply the document store schema and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        match command {
            Command::Db(DbCommand::Migrate) => {
                run_db_migrate(&cli.serve).await?;
                return Ok(());
            }
        }
    }

    run_server(cli.serve).await
}

async fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let ConfigLoad {
        mut config,
        warnings,
    } = ConfigLoader::new()
        .with_file(args.config.clone())
        .load()
        .context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }

    if !warnings.is_empty() {
        for warning in &warnings.items {
            match &warning.hint {
                Some(hint) => {
                    warn!(message = %warning.message, hint = %hint, "configuration warning")
                }
                None => {
                    warn!(message = %warning.message, "configuration warning")
                }
            }
        }
    }

    info!(
        alerts.refresh_ttl = config.alerts.refresh_ttl_seconds,
        alerts.max_alerts = config.alerts.max_alerts,
        alerts.call_timeout = config.alerts.call_timeout_seconds,
        alerts.engine_configured = config.alerts.engine_url.is_some(),
        watch.agent_configured = config.watch.fiscal_agent_url.is_some(),
        "module configuration in effect"
    );

    Ok(Arc::new(config))
}

async fn connect_store(config: &Config) -> anyhow::Result<Store> {
    let url = config.database.url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL must be provided for the document store")
    })?;

    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
        anyhow::bail!(
            "Invalid database URL: must start with postgres:// or postgresql://"
        );
    }

    let store = Store::connect(url)
        .await
        .context("failed to connect to the document store")?;

    info!("Successfully connected to PostgreSQL");
    Ok(store)
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args).await?;
    let store = connect_store(&config).await?;
    store
        .initialize_schema()
        .await
        .context("schema migration failed")?;
    info!("Document store schema applied successfully");
    Ok(())
}

fn wire_app_state(config: Arc<Config>, store: &Store) -> AppState {
    let handles = store.handles();

    let auth = Arc::new(AuthService::new(
        config.auth.token_key.as_bytes(),
        config.auth.token_ttl_seconds,
    ));

    let call_timeout = Duration::from_secs(config.alerts.call_timeout_seconds);

    let engine = config.alerts.engine_url.clone().map(|url| {
        let credentials = CredentialChain::standard(
            config.alerts.service_account_json.clone(),
        );
        Arc::new(EngineClient::new(url, credentials, call_timeout))
    });

    let gate = engine.clone().map(|engine| {
        let dispatcher: Arc<dyn ScanDispatcher> = engine;
        Arc::new(RefreshGate::new(
            handles.refresh_state.clone(),
            dispatcher,
            call_timeout,
        ))
    });

    let watch = config.watch.fiscal_agent_url.clone().map(|url| {
        Arc::new(WatchAnalyzer::new(
            handles.settings.clone(),
            handles.info_alerts.clone(),
            FiscalAgentClient::new(
                url,
                Duration::from_secs(config.watch.call_timeout_seconds),
            ),
        ))
    });

    AppState::new(config, handles, gate, engine, watch, auth)
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(&args).await?;

    let store = connect_store(&config).await?;
    store
        .initialize_schema()
        .await
        .context("failed to initialize the document store schema")?;

    let state = wire_app_state(Arc::clone(&config), &store);
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!(
        "Starting Vigil backend on {}:{}",
        config.server.host, config.server.port
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
