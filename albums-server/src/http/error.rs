//! API error type with IntoResponse
//!
//! Bodies are plain text: the status reason by default, or the raw store
//! error for 500s when the server runs with error exposure turned on.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::{AccessError, AcquireError};

#[derive(Debug)]
pub enum ApiError {
    /// No store handle could be acquired (503)
    Unavailable(AcquireError),

    /// Handler ran without a bound store handle (422)
    MissingStore,

    /// Listing failed on a live handle (500, logged)
    Store { source: AccessError, expose: bool },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::MissingStore => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_owned()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Unavailable(err) => {
                tracing::warn!(error = %err, "store unavailable");
                let retry_after = match err {
                    AcquireError::CircuitOpen { remaining_ms } => remaining_ms.div_ceil(1000).max(1),
                    AcquireError::Unavailable(_) => 1,
                };
                let mut response = (status, reason(status)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            Self::MissingStore => {
                tracing::error!("no store handle bound to request");
                (status, reason(status)).into_response()
            }
            Self::Store { source, expose } => {
                tracing::error!(error = %source, "album listing failed");
                let body = if expose {
                    source.to_string()
                } else {
                    reason(status)
                };
                (status, body).into_response()
            }
        }
    }
}

impl From<AcquireError> for ApiError {
    fn from(e: AcquireError) -> Self {
        Self::Unavailable(e)
    }
}
