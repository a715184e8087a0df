//! Handlers for `/api/cards` endpoints.
//!
//! | Method   | Path                      | Notes |
//! |----------|---------------------------|-------|
//! | `POST`   | `/cards`                  | Body: card draft; `201`, or `400` listing missing fields |
//! | `GET`    | `/cards`                  | Every stored card |
//! | `GET`    | `/cards/{id}`             | `ETag`; `304` on `If-None-Match` |
//! | `DELETE` | `/cards/{id}`             | `204`, `404` if absent |
//! | `GET`    | `/cards/{id}/token`       | Transport token and viewer URL |
//! | `POST`   | `/cards/{id}/share`       | `?mode=image\|link\|auto` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use cardshare_core::{Card, CardDraft, CardId, codec};
use cardshare_remote::Publication;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::stored_card;
use crate::{
  AppState,
  error::ApiError,
  etag::{compute_etag, if_none_match},
  share::ShareMode,
};

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /cards`
pub async fn create(
  State(state): State<AppState>,
  Json(draft): Json<CardDraft>,
) -> Result<impl IntoResponse, ApiError> {
  let card = draft.into_card()?;
  state.repo.save(&card).await?;
  info!(id = %card.id, "card created");
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "id": card.id,
      "message": "Card created successfully",
      "card": card,
    })),
  ))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /cards`
pub async fn list(State(state): State<AppState>) -> Json<serde_json::Value> {
  let cards = state.repo.get_all().await;
  Json(json!({ "success": true, "count": cards.len(), "cards": cards }))
}

// ─── Get / delete ────────────────────────────────────────────────────────────

/// `GET /cards/{id}`
pub async fn get_one(
  State(state): State<AppState>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let card = stored_card(&state, &CardId::new(id)).await?;
  let etag = compute_etag(&card);

  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }
  Ok(([(header::ETAG, etag)], Json(card)).into_response())
}

/// `DELETE /cards/{id}`
pub async fn delete_one(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  let id = CardId::new(id);
  if !state.repo.exists(&id).await {
    return Err(ApiError::NotFound);
  }
  state.repo.delete(&id).await?;
  info!(%id, "card deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Token ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
  pub token:       String,
  pub viewer_url:  String,
  pub fits_in_qr:  bool,
}

/// `GET /cards/{id}/token`
pub async fn token(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<TokenBody>, ApiError> {
  let card = stored_card(&state, &CardId::new(id)).await?;
  let token = codec::encode(&card);
  let viewer_url = state.share.viewer_url(&card.id, &token);
  let fits_in_qr = codec::fits_in_qr(&viewer_url, state.share.max_link_len());
  Ok(Json(TokenBody { token, viewer_url, fits_in_qr }))
}

// ─── Share ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ShareParams {
  #[serde(default)]
  pub mode: ShareMode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareBody {
  pub success:     bool,
  pub mode:        ShareMode,
  pub card:        Card,
  pub token:       String,
  pub viewer_url:  String,
  pub target:      String,
  pub publication: Option<Publication>,
  /// The QR code as a `data:` URL.
  pub qr_code:     String,
}

/// `POST /cards/{id}/share?mode=<mode>`
pub async fn share(
  State(state): State<AppState>,
  Path(id): Path<String>,
  Query(params): Query<ShareParams>,
) -> Result<Json<ShareBody>, ApiError> {
  let card = stored_card(&state, &CardId::new(id)).await?;
  let pkg = state.share.share(&card, params.mode).await?;
  Ok(Json(ShareBody {
    success: true,
    mode: pkg.mode,
    card,
    token: pkg.token,
    viewer_url: pkg.viewer_url,
    target: pkg.target,
    publication: pkg.publication,
    qr_code: pkg.qr.to_data_url(),
  }))
}
