mod assemble;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod joins;
mod models;
mod normalize;
mod pipeline;
mod query;
mod routes;
mod store;
mod validate;
mod writer;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::{catalog::SourceCatalog, config::Config, store::MovieStore};

#[derive(Debug, Parser)]
#[command(name = "cinedex")]
#[command(about = "Denormalizes the title catalog and serves the movie API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the read API.
    Serve,
    /// Rebuild the movie collection from the source tables, then exit.
    Build,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: MovieStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,cinedex=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);
    let db = db::connect_and_migrate(&config.database_url).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let state = Arc::new(AppState { config: config.clone(), store: MovieStore::new(db) });
            let app = routes::router(state);

            let listener = tokio::net::TcpListener::bind(config.addr).await?;
            info!(addr = %config.addr, "listening");
            axum::serve(listener, app).await?;
        },
        Commands::Build => {
            let catalog = SourceCatalog::new(db.clone());
            let store = MovieStore::new(db);

            let summary = pipeline::run(&catalog, &store, config.pipeline()).await?;
            for failed in &summary.failed {
                warn!(tconst = %failed.tconst, reason = %failed.reason, "movie not written");
            }
            info!(
                written = summary.written,
                rejected = summary.rejected,
                failed = summary.failed.len(),
                "build complete"
            );
        },
    }

    Ok(())
}
