//! albums-server: HTTP server for the album catalog
//!
//! Serves `GET /` as a JSON array of every row in the `album` table.
//! Each request checks a handle out of the pool, carries it as a typed
//! request extension, and gives it back when the request finishes.

pub mod breaker;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod state;

#[cfg(test)]
mod testing;

pub use error::{AccessError, AcquireError};
pub use models::Album;
pub use state::AppState;
