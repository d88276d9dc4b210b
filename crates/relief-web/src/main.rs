//! relief-web server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), then `RELIEF_*`
//! environment variables, then command-line overrides. Loads the model
//! artifact once and serves the query pages over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use relief_model::Classifier;
use relief_web::{AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Disaster response message classifier server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Address to bind.
  #[arg(long)]
  host: Option<String>,

  #[arg(short, long)]
  port: Option<u16>,

  /// Model artifact written by `relief train-classifier`.
  #[arg(short, long)]
  model: Option<PathBuf>,

  /// SQLite database written by `relief process-data`.
  #[arg(short, long)]
  store: Option<PathBuf>,

  /// Table name inside the store.
  #[arg(long)]
  table: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = load_config(&cli)?;

  let model_path = server_cfg.model_path.clone();
  let classifier = tokio::task::spawn_blocking(move || Classifier::load(&model_path))
    .await
    .context("model loading task panicked")?
    .with_context(|| format!("failed to load model from {:?}", server_cfg.model_path))?;

  let store = match &server_cfg.store_path {
    Some(path) => {
      let store = relief_web::open_store(path, &server_cfg.table).await?;
      Some(Arc::new(store))
    }
    None => None,
  };

  let state = AppState {
    classifier: Arc::new(classifier),
    store,
  };

  let app = relief_web::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Layer the config file, `RELIEF_*` environment and CLI flags over the
/// built-in defaults.
fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
  let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("RELIEF"))
    .set_override_option("host", cli.host.clone())?
    .set_override_option("port", cli.port.map(i64::from))?
    .set_override_option("model_path", path_str(&cli.model))?
    .set_override_option("store_path", path_str(&cli.store))?
    .set_override_option("table", cli.table.clone())?
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}
