//! Downloads derived from a stored card: contact file, card image, QR code.

use axum::{
  extract::{Path, State},
  http::header,
  response::{IntoResponse, Response},
};
use cardshare_core::{CardId, raster::PNG};

use super::{attachment, stored_card};
use crate::{AppState, error::ApiError};

/// `GET /cards/{id}/vcard`
pub async fn vcard(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Response, ApiError> {
  let card = stored_card(&state, &CardId::new(id)).await?;
  let body = cardshare_vcard::serialize(&card);
  Ok(attachment(cardshare_vcard::CONTENT_TYPE, &cardshare_vcard::file_name(&card), body))
}

/// `GET /cards/{id}/image`
pub async fn image(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Response, ApiError> {
  let card = stored_card(&state, &CardId::new(id)).await?;
  let png = state.share.renderer().render(&card).await?;
  let name = format!("{}_card.png", card.file_stem());
  Ok(attachment(&png.media_type, &name, png.data))
}

/// `GET /cards/{id}/qrcode`
///
/// Encodes the card page URL, so the card need not exist yet.
pub async fn qrcode(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Response, ApiError> {
  let id = CardId::new(id);
  if !id.is_url_safe() {
    return Err(ApiError::NotShareable);
  }
  let qr = state.share.qr().emit(&state.share.card_url(&id)).await?;
  let mut resp = attachment(PNG, &format!("qr-code-{id}.png"), qr.data);
  resp
    .headers_mut()
    .insert(header::CACHE_CONTROL, header::HeaderValue::from_static("public, max-age=3600"));
  Ok(resp.into_response())
}
