//! HTTP surface and share pipeline for cardshare.
//!
//! Exposes an axum [`Router`] over a tiered card [`Repository`] and a
//! [`ShareService`]. Routes live under `/api`:
//!
//! ```text
//! /api/cards                 POST create, GET list
//! /api/cards/{id}            GET (ETag), DELETE
//! /api/cards/{id}/token      GET transport token + viewer URL
//! /api/cards/{id}/vcard      GET contact file
//! /api/cards/{id}/image      GET rendered PNG
//! /api/cards/{id}/qrcode     GET QR of the card page
//! /api/cards/{id}/share      POST ?mode=image|link|auto
//! /api/public/{id}           GET viewer resolution (?data=<token>)
//! /api/public/{id}/vcard     GET contact file of the resolved card
//! ```

pub mod config;
pub mod error;
pub mod etag;
pub mod handlers;
pub mod share;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use cardshare_core::{
  MAX_PROFILE_IMAGE_BYTES, Repository,
  fallback::FallbackChain,
  tier::{MemoryTier, Tier},
};
use cardshare_remote::{ImagePublisher, ImgBbHost, QrEmitter};
use cardshare_render::{CardRenderer, Fonts};
use cardshare_store::{DirTier, SqliteTier};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use error::{ApiError, Error, Result};
pub use share::{ShareMode, SharePackage, ShareService};

use handlers::{cards, media, public};

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub repo:   Arc<Repository>,
  pub share:  Arc<ShareService>,
  pub config: Arc<ServerConfig>,
}

impl AppState {
  /// Open the storage tiers and build the remote clients described by
  /// `config`.
  pub async fn open(config: ServerConfig) -> Result<Self> {
    let storage = &config.storage;
    if let Some(parent) = storage.database.parent() {
      tokio::fs::create_dir_all(parent).await.map_err(cardshare_store::Error::from)?;
    }
    let tiers: Vec<Arc<dyn Tier>> = vec![
      Arc::new(MemoryTier::new()),
      Arc::new(DirTier::open(&storage.data_dir, storage.durable_quota_bytes).await?),
      Arc::new(SqliteTier::open(&storage.database).await?),
    ];
    let repo = Repository::new(tiers)?;
    info!(tiers = ?repo.tier_names(), "repository ready");

    let client = cardshare_remote::http_client(Duration::from_secs(config.qr.timeout_secs))?;

    let render = &config.render;
    let fonts = Fonts::load(render.font_regular.as_deref(), render.font_bold.as_deref());
    let renderer = CardRenderer::new(fonts).with_client(client.clone());

    let publisher = match &config.image_host.api_key {
      Some(key) if !key.is_empty() => {
        let host = ImgBbHost::new(client.clone(), &config.image_host.endpoint, key)
          .with_expiration(config.image_host.expiration_secs);
        ImagePublisher::new(FallbackChain::new().with(host))
      }
      _ => {
        info!("no image host api key configured; shared images will be embedded");
        ImagePublisher::embedded_only()
      }
    };

    let qr = QrEmitter::standard(
      client,
      &config.qr.primary_endpoint,
      &config.qr.fallback_endpoint,
      config.qr.size,
    );

    let share =
      ShareService::new(renderer, publisher, qr, &config.base_url, config.share.max_link_len);

    Ok(Self { repo: Arc::new(repo), share: Arc::new(share), config: Arc::new(config) })
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Request body cap: a base64 profile image at the size limit plus room for
/// the other card fields. Larger images are refused by validation instead of
/// the extractor.
pub const MAX_BODY_BYTES: usize = MAX_PROFILE_IMAGE_BYTES.div_ceil(3) * 4 + 64 * 1024;

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/api/cards", get(cards::list).post(cards::create))
    .route("/api/cards/{id}", get(cards::get_one).delete(cards::delete_one))
    .route("/api/cards/{id}/token", get(cards::token))
    .route("/api/cards/{id}/share", post(cards::share))
    .route("/api/cards/{id}/vcard", get(media::vcard))
    .route("/api/cards/{id}/image", get(media::image))
    .route("/api/cards/{id}/qrcode", get(media::qrcode))
    .route("/api/public/{id}", get(public::view))
    .route("/api/public/{id}/vcard", get(public::vcard))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Test support ────────────────────────────────────────────────────────────
