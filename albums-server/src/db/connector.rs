//! Per-request store access
//!
//! [`Connector`] hands out one [`AlbumSource`] per request. The Postgres
//! implementation checks a connection out of the pool; dropping the source
//! returns it.

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

use super::albums::AlbumRepo;
use crate::error::{AccessError, AcquireError};
use crate::models::Album;

/// A live handle that can list albums.
#[async_trait]
pub trait AlbumSource: Send {
    async fn list_albums(&mut self) -> Result<Vec<Album>, AccessError>;
}

/// Produces a fresh [`AlbumSource`] for each request.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn AlbumSource>, AcquireError>;
}

/// Pool-backed connector.
#[derive(Clone)]
pub struct PgConnector {
    pool: PgPool,
}

impl PgConnector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn acquire(&self) -> Result<Box<dyn AlbumSource>, AcquireError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(AcquireError::Unavailable)?;
        Ok(Box::new(PgSource { conn }))
    }
}

struct PgSource {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl AlbumSource for PgSource {
    async fn list_albums(&mut self) -> Result<Vec<Album>, AccessError> {
        AlbumRepo::new(&mut self.conn).list().await
    }
}
