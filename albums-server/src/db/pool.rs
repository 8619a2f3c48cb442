//! Database connection pool management
//!
//! Pool sizing is left at the sqlx default. The pool is built lazily so the
//! server can start while the store is down; each request then fails with
//! 503 until it comes back.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// How long a request waits for a connection before giving up.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a lazily-connecting PostgreSQL pool.
///
/// # Errors
///
/// Returns an error if `database_url` cannot be parsed. No connection is
/// attempted here.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/recordings")?;
/// ```
pub fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_timeout(database_url, DEFAULT_ACQUIRE_TIMEOUT)
}

/// Create a lazily-connecting pool with a custom acquire timeout.
pub fn create_pool_with_timeout(
    database_url: &str,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        // Nothing listens on port 1; building the pool must still succeed.
        let pool = create_pool("postgres://albums@127.0.0.1:1/recordings");
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn rejects_malformed_url() {
        assert!(create_pool("not a url").is_err());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }
}
