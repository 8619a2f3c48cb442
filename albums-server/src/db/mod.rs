//! Database layer - connection pool, per-request connector and the album accessor
//!
//! - One pool per process, one checked-out connection per request
//! - A single fixed read query; no writes, no migrations
//! - Row streams are owned by the accessor and dropped on every exit path

pub mod albums;
pub mod connector;
pub mod pool;

pub use albums::{collect_albums, AlbumRepo, AlbumRow, LIST_ALBUMS_SQL};
pub use connector::{AlbumSource, Connector, PgConnector};
pub use pool::{create_pool, create_pool_with_timeout};
