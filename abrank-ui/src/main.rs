//! abrank-ui - pairwise answer annotation service
//!
//! Serves a localhost web UI for comparing pairs of model answers and
//! recording judgments. Question sets load from a JSON file under the root
//! folder; annotations persist to the sqlite database (signed in) or a
//! local JSON document (anonymous).

use abrank_common::config::{resolve_root_folder, StoragePaths};
use abrank_common::db::init_database;
use abrank_ui::{build_router, AppState};
use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "abrank-ui", about = "Pairwise answer annotation service")]
struct Args {
    /// Root folder holding the database, question set, and previews
    #[arg(long)]
    root_folder: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 5750)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification before any slow startup work
    info!(
        "Starting abrank-ui v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref())?;
    let paths = StoragePaths::new(root_folder);
    paths.ensure_directories()?;
    info!("Root folder: {}", paths.root().display());

    let pool = init_database(&paths.database()).await?;

    // Question-set load failure blocks startup; there is nothing to
    // annotate without it and no automatic retry
    let state = match AppState::new(pool, paths.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to load question set: {}", e);
            error!(
                "Place a JSON question array at {} and restart.",
                paths.questions().display()
            );
            return Err(e.into());
        }
    };

    {
        let session = state.session.read().await;
        info!(
            "Loaded {} questions, {} annotations (anonymous)",
            session.questions.len(),
            session.annotations.all().len()
        );
    }

    let app = build_router(state);

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("abrank-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
