//! HTTP server command

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use albums_server::breaker::{BreakerPolicy, DEFAULT_FAILURE_THRESHOLD};
use albums_server::db::create_pool;
use albums_server::http::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "ALBUMS_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "ALBUMS_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Consecutive connection failures before failing fast
    #[arg(long, env = "ALBUMS_BREAKER_THRESHOLD", default_value_t = DEFAULT_FAILURE_THRESHOLD)]
    pub breaker_threshold: u32,

    /// Seconds to fail fast before trying the database again
    #[arg(long, env = "ALBUMS_BREAKER_COOLDOWN", default_value = "10")]
    pub breaker_cooldown: u64,

    /// Return raw database errors in 500 responses - development only
    #[arg(long, env = "ALBUMS_EXPOSE_ERRORS")]
    pub expose_errors: bool,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            request_timeout: Duration::from_secs(self.request_timeout),
            breaker: BreakerPolicy {
                failure_threshold: self.breaker_threshold,
                open_duration: Duration::from_secs(self.breaker_cooldown),
            },
            expose_errors: self.expose_errors,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.server_config();
    tracing::info!("Starting album server on {}", config.bind_addr);

    // Lazy pool: a database that is down at startup only fails requests.
    let pool = create_pool(&args.database_url).context("Invalid DATABASE_URL")?;

    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
