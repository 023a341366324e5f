//! Earth Engine viewer API server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Extension;
use clap::Parser;
use ee_client::client::DEFAULT_API_BASE;
use ee_client::{ClientConfig, Credentials, HttpEarthEngineClient};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use viewer_api::config::{self, ViewerConfig, DEFAULT_USER, DEFAULT_USER_HEADER};
use viewer_api::state::AppState;

/// Earth Engine viewer API server
#[derive(Parser, Debug)]
#[command(name = "viewer-api")]
#[command(about = "Browse Google Earth Engine imagery and plot time series")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "VIEWER_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "VIEWER_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Cloud project used for Earth Engine requests
    #[arg(long, default_value = "earthengine-legacy", env = "EE_PROJECT")]
    ee_project: String,

    /// Earth Engine REST API base URL
    #[arg(long, default_value = DEFAULT_API_BASE, env = "EE_API_BASE")]
    ee_api_base: String,

    /// Timeout for each Earth Engine request, in seconds
    #[arg(long, default_value_t = 60, env = "EE_TIMEOUT_SECS")]
    ee_timeout_secs: u64,

    /// Service account email
    #[arg(long, env = "EE_SERVICE_ACCOUNT")]
    service_account: Option<String>,

    /// Service account private key JSON file
    #[arg(long, env = "EE_PRIVATE_KEY")]
    private_key: Option<PathBuf>,

    /// Folder holding per-user boundary assets
    /// (default: projects/<project>/assets/earth_engine_app)
    #[arg(long, env = "EE_ASSET_ROOT")]
    asset_root: Option<String>,

    /// Directory holding per-user workspaces
    #[arg(long, default_value = "workspaces", env = "VIEWER_WORKSPACE_DIR")]
    workspace_dir: PathBuf,

    /// Product catalog YAML (default: built-in catalog)
    #[arg(long, env = "VIEWER_CATALOG")]
    catalog: Option<PathBuf>,

    /// Header carrying the authenticated user id
    #[arg(long, default_value = DEFAULT_USER_HEADER, env = "VIEWER_USER_HEADER")]
    user_header: String,

    /// User id when the header is absent
    #[arg(long, default_value = DEFAULT_USER, env = "VIEWER_DEFAULT_USER")]
    default_user: String,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value_t = 50, env = "VIEWER_MAX_UPLOAD_MB")]
    max_upload_mb: usize,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    runtime.block_on(async move {
        if let Err(e) = run_server(args).await {
            error!("Server failed: {:#}", e);
            std::process::exit(1);
        }
    });
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting Earth Engine viewer API");

    let catalog = config::load_catalog(args.catalog.as_ref())?;
    info!(products = catalog.product_count(), "Loaded product catalog");

    let credentials = Credentials::resolve(args.service_account.as_deref(), args.private_key.as_deref());
    let client = HttpEarthEngineClient::new(
        ClientConfig {
            project: args.ee_project.clone(),
            api_base: args.ee_api_base.clone(),
            timeout: Duration::from_secs(args.ee_timeout_secs),
        },
        credentials,
    )
    .context("Failed to create Earth Engine client")?;

    let viewer_config = ViewerConfig {
        workspace_dir: args.workspace_dir.clone(),
        user_header: args.user_header.to_ascii_lowercase(),
        default_user: args.default_user.clone(),
        asset_root: args
            .asset_root
            .clone()
            .unwrap_or_else(|| config::default_asset_root(&args.ee_project)),
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    std::fs::create_dir_all(&viewer_config.workspace_dir).with_context(|| {
        format!(
            "Failed to create workspace directory {}",
            viewer_config.workspace_dir.display()
        )
    })?;

    info!(
        project = %args.ee_project,
        asset_root = %viewer_config.asset_root,
        workspace = %viewer_config.workspace_dir.display(),
        "Earth Engine configured"
    );

    let state = Arc::new(AppState::new(viewer_config, catalog, Arc::new(client)));
    let app = viewer_api::app(state).layer(Extension(prometheus_handle));

    // Parse listen address
    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Viewer API listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
