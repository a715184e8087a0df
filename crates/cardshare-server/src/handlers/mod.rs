pub mod cards;
pub mod media;
pub mod public;

use axum::{
  http::header,
  response::{IntoResponse, Response},
};
use cardshare_core::{Card, CardId};

use crate::{AppState, error::ApiError};

/// Load a stored card or answer `404`.
pub(super) async fn stored_card(state: &AppState, id: &CardId) -> Result<Card, ApiError> {
  state.repo.get(id).await.ok_or(ApiError::NotFound)
}

/// A downloadable body with a `Content-Disposition: attachment` header.
pub(super) fn attachment(
  content_type: &str,
  file_name: &str,
  body: impl IntoResponse,
) -> Response {
  (
    [
      (header::CONTENT_TYPE, content_type.to_owned()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
    ],
    body,
  )
    .into_response()
}
