//! One-shot listing: print the same JSON `GET /` would return

use anyhow::{Context, Result};
use clap::Parser;

use albums_server::db::{create_pool, AlbumRepo};

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run_list(args: ListArgs) -> Result<()> {
    let pool = create_pool(&args.database_url).context("Invalid DATABASE_URL")?;
    let mut conn = pool
        .acquire()
        .await
        .context("Failed to connect to database")?;

    let albums = AlbumRepo::new(&mut conn)
        .list()
        .await
        .context("Failed to list albums")?;
    tracing::debug!(count = albums.len(), "albums listed");

    let json = if args.pretty {
        serde_json::to_string_pretty(&albums)?
    } else {
        serde_json::to_string(&albums)?
    };
    println!("{json}");

    Ok(())
}
