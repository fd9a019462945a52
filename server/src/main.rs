use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use gptnix::{Config, ConversationStore, QueryHandler, DB_NAME};
use miette::{IntoDiagnostic, Result};
use server::AppState;

#[derive(Parser, Debug)]
#[command(name = "server", about = "HTTP backend for the GPTNix chat")]
struct Args {
    #[arg(long, env = "GPTNIX_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// SQLite database holding the conversations.
    #[arg(long, env = "GPTNIX_DATABASE", default_value = DB_NAME)]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    gptnix::init_tracing();

    let args = Args::parse();

    let config = Config::from_env()?;
    let client = config.client()?;
    let store = ConversationStore::open(&args.database)?;
    let handler = QueryHandler::new(Arc::new(client), store, config.model());

    let app = server::router(AppState::new(handler));

    tracing::info!(addr = %args.bind, model = config.model(), "listening");

    axum::Server::bind(&args.bind)
        .serve(app.into_make_service())
        .await
        .into_diagnostic()?;

    Ok(())
}
