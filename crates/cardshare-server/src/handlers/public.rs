//! Viewer endpoints for shared links: `/public/{id}?data=<token>`.
//!
//! Resolution order is token, then repository, then the placeholder card.

use axum::{
  Json,
  extract::{Path, Query, State},
  response::Response,
};
use cardshare_core::{
  Card, CardId,
  viewer::{self, CardSource},
};
use serde::{Deserialize, Serialize};

use super::attachment;
use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ViewerParams {
  pub data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ViewerBody {
  pub success:     bool,
  pub card:        Card,
  pub source:      CardSource,
  pub placeholder: bool,
}

/// `GET /public/{id}[?data=<token>]`
pub async fn view(
  State(state): State<AppState>,
  Path(id): Path<String>,
  Query(params): Query<ViewerParams>,
) -> Result<Json<ViewerBody>, ApiError> {
  let resolved = viewer::resolve(&state.repo, &CardId::new(id), params.data.as_deref()).await?;
  Ok(Json(ViewerBody {
    success:     true,
    placeholder: resolved.is_placeholder(),
    card:        resolved.card,
    source:      resolved.source,
  }))
}

/// `GET /public/{id}/vcard[?data=<token>]`
pub async fn vcard(
  State(state): State<AppState>,
  Path(id): Path<String>,
  Query(params): Query<ViewerParams>,
) -> Result<Response, ApiError> {
  let resolved = viewer::resolve(&state.repo, &CardId::new(id), params.data.as_deref()).await?;
  let card = resolved.card;
  Ok(attachment(
    cardshare_vcard::CONTENT_TYPE,
    &cardshare_vcard::file_name(&card),
    cardshare_vcard::serialize(&card),
  ))
}
