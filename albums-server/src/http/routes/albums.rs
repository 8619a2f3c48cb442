//! Album listing endpoint

use axum::{extract::State, middleware, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::Db;
use crate::http::middleware::bind_store;
use crate::models::Album;
use crate::state::AppState;

/// GET / - every album, in store order
async fn list_albums(
    State(state): State<AppState>,
    Db(store): Db,
) -> Result<Json<Vec<Album>>, ApiError> {
    let albums = store.list_albums().await.map_err(|source| ApiError::Store {
        source,
        expose: state.expose_errors(),
    })?;

    tracing::debug!(count = albums.len(), "albums listed");
    Ok(Json(albums))
}

/// Album routes, each wrapped in the store binder.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_albums))
        .route_layer(middleware::from_fn_with_state(state, bind_store))
}

/// Album routes without the binder; requests reach the handler with no store.
#[cfg(test)]
pub(crate) fn unbound_router() -> Router<AppState> {
    Router::new().route("/", get(list_albums))
}
