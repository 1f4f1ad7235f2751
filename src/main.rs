//! Txview main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;
use txview_api::start_server;
use txview_config::Config;
use txview_core::{DefaultErrorLogger, TransactionList};
use txview_store::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "txview")]
#[command(version = "0.1.0")]
#[command(about = "A transaction list viewer with month grouping and authorization deletes", long_about = None)]
struct Args {
    /// Configuration file path; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                init_logging("info");
                log::error!("{}", e);
                for suggestion in e.suggestions() {
                    log::error!("  - {}", suggestion);
                }
                return Err(e)
                    .with_context(|| format!("Failed to load configuration from {}", path.display()));
            }
        },
        None => Config::default(),
    };

    init_logging(&config.logging.level);

    log::info!(
        "Config loaded: source={}, user={}, locale={}, sort={}",
        config.source.path.display(),
        config.source.user_id,
        config.display.locale,
        config.display.default_sort
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store = Arc::new(JsonFileStore::new(config.source.path.clone()));
        let mut list = TransactionList::new(
            &config,
            store.clone(),
            store,
            Arc::new(DefaultErrorLogger),
        );

        match list.refresh().await {
            Ok(()) => log::info!(
                "Loaded {} month sections",
                list.sections().len()
            ),
            Err(e) => log::error!("Initial fetch failed: {}", e),
        }

        start_server(config, Arc::new(Mutex::new(list)))
            .await
            .context("Server error")
    })
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
