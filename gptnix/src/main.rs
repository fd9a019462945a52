use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gptnix::{Config, ConversationStore, QueryHandler, DB_NAME};
use miette::{IntoDiagnostic, Result, WrapErr};
use shared::UserId;

#[derive(Parser, Debug)]
#[command(name = "gptnix-cli", about = "Ask Nix 1 from the terminal")]
struct Cli {
    /// SQLite database holding the conversations.
    #[arg(long, env = "GPTNIX_DATABASE", default_value = DB_NAME, global = true)]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one query and print the answer.
    Ask {
        query: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Print a user's stored conversations, oldest first.
    History {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    gptnix::init_tracing();

    let cli = Cli::parse();
    let store = ConversationStore::open(&cli.database)
        .into_diagnostic()
        .wrap_err("Could not open conversation store")?;

    match cli.command {
        Command::Ask { query, user } => {
            let config = Config::from_env()?;
            let client = config.client()?;
            let handler = QueryHandler::new(Arc::new(client), store, config.model());

            let user = user.as_deref().and_then(UserId::parse);
            let answer = handler.ask(user.as_ref(), &query).await?;

            println!("{answer}");
        }
        Command::History { user } => {
            let user = UserId::parse(&user);
            for record in store.list_by_user(user.as_ref()).into_diagnostic()? {
                println!("> {}\n{}\n", record.query, record.response);
            }
        }
    }

    Ok(())
}
