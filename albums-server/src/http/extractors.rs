//! Custom Axum extractors

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use super::middleware::StoreHandle;

/// The store handle bound to this request by [`bind_store`].
///
/// Rejects with 422 when the route was mounted without the binder.
///
/// [`bind_store`]: super::middleware::bind_store
pub struct Db(pub StoreHandle);

impl<S> FromRequestParts<S> for Db
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Taken, not cloned: the handler owns the only reference from here on.
        parts
            .extensions
            .remove::<StoreHandle>()
            .map(Self)
            .ok_or(ApiError::MissingStore)
    }
}
