//! Error types and the axum [`IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cardshare_core::{ValidationError, error::BoxError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures while assembling or running the share pipeline.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] cardshare_core::Error),

  #[error("storage: {0}")]
  Store(#[from] cardshare_store::Error),

  #[error("render: {0}")]
  Render(#[from] cardshare_render::Error),

  #[error("remote: {0}")]
  Remote(#[from] cardshare_remote::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error returned by an HTTP handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("card not found")]
  NotFound,

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("card link is not shareable")]
  NotShareable,

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Every remote provider failed.
  #[error("upstream unavailable: {0}")]
  Upstream(String),

  #[error("internal error: {0}")]
  Internal(#[source] BoxError),
}

impl From<cardshare_core::Error> for ApiError {
  fn from(e: cardshare_core::Error) -> Self {
    match e {
      cardshare_core::Error::Validation(v) => ApiError::Validation(v),
      cardshare_core::Error::NotShareable(_) => ApiError::NotShareable,
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<cardshare_remote::Error> for ApiError {
  fn from(e: cardshare_remote::Error) -> Self {
    use cardshare_remote::Error as R;
    match e {
      R::EmptyPayload => ApiError::BadRequest(e.to_string()),
      R::Exhausted(_) | R::Http(_) | R::Status(_) | R::Rejected(_) => {
        ApiError::Upstream(e.to_string())
      }
      R::Io(_) => ApiError::Internal(Box::new(e)),
    }
  }
}

impl From<cardshare_render::Error> for ApiError {
  fn from(e: cardshare_render::Error) -> Self { ApiError::Internal(Box::new(e)) }
}

impl From<Error> for ApiError {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(e) => e.into(),
      Error::Remote(e) => e.into(),
      Error::Render(e) => e.into(),
      Error::Store(e) => ApiError::Internal(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(v) => (
        StatusCode::BAD_REQUEST,
        Json(json!({
          "error": if v.missing.is_empty() { "Invalid profile image" } else { "Missing required fields" },
          "missingFields": v.missing,
          "message": v.message(),
        })),
      )
        .into_response(),
      ApiError::NotFound => (StatusCode::NOT_FOUND, Json(json!({ "error": "Card not found" })))
        .into_response(),
      ApiError::NotShareable => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "This card link is not shareable" })),
      )
        .into_response(),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Upstream(m) => {
        error!(error = %m, "upstream providers failed");
        (StatusCode::BAD_GATEWAY, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Internal(e) => {
        error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
          .into_response()
      }
    }
  }
}
