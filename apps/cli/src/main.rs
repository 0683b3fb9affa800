//! gotasks - terminal client
//!
//! Authorization URLs are printed instead of opened in frames; paste the
//! URL the browser was redirected to back into the prompt.

mod launcher;
mod render;
mod shell;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use gotasks_core::{App, Config, CLIENT_ID_ENV};

use crate::launcher::ConsoleLauncher;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON config file
    #[arg(long, env = "GOTASKS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the database
    #[arg(long, env = "GOTASKS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// OAuth2 client id
    #[arg(long, env = CLIENT_ID_ENV)]
    client_id: Option<String>,

    /// Route to open first, e.g. `#setting`
    #[arg(long, default_value = "#tasks")]
    route: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gotasks_core::init_logging();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => match &args.data_dir {
            Some(dir) => Config::new(dir.clone()),
            None => Config::default(),
        },
    }
    .with_env_overrides();

    if let Some(client_id) = args.client_id {
        config.client_id = client_id;
    }

    let launcher = ConsoleLauncher::new();
    let app = App::new(config, Arc::new(launcher.clone())).context("failed to start")?;
    app.router().navigate_hash(&args.route);

    tracing::info!(route = %app.router().current(), "gotasks started");

    shell::run(&app, &launcher).await
}
