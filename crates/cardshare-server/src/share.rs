//! The share pipeline: a card in, a distributable QR code out.
//!
//! ```text
//! link:  encode ──► viewer URL ──► QR
//! image: render ──► publish (hosted | embedded) ──► QR of the publication URL
//! auto:  link when the viewer URL fits, image otherwise
//! ```

use cardshare_core::{Card, CardId, RasterImage, codec};
use cardshare_remote::{ImagePublisher, Publication, QrEmitter, publish::upload_name};
use cardshare_render::CardRenderer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareMode {
  /// Render, publish, and point the QR code at the image.
  Image,
  /// Point the QR code at the viewer URL carrying the encoded card.
  Link,
  #[default]
  Auto,
}

/// Everything needed to distribute one card.
#[derive(Debug, Clone)]
pub struct SharePackage {
  /// `Image` or `Link`; never `Auto`.
  pub mode:        ShareMode,
  pub token:       String,
  pub viewer_url:  String,
  /// What the QR code encodes.
  pub target:      String,
  /// Present in image mode only.
  pub publication: Option<Publication>,
  pub qr:          RasterImage,
}

pub struct ShareService {
  renderer:     CardRenderer,
  publisher:    ImagePublisher,
  qr:           QrEmitter,
  base_url:     String,
  max_link_len: usize,
}

impl ShareService {
  pub fn new(
    renderer: CardRenderer,
    publisher: ImagePublisher,
    qr: QrEmitter,
    base_url: impl Into<String>,
    max_link_len: usize,
  ) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_owned();
    Self { renderer, publisher, qr, base_url, max_link_len }
  }

  pub fn renderer(&self) -> &CardRenderer { &self.renderer }

  pub fn qr(&self) -> &QrEmitter { &self.qr }

  pub fn max_link_len(&self) -> usize { self.max_link_len }

  /// `<base>/public/<id>?data=<token>`. Tokens are URL-safe as produced.
  pub fn viewer_url(&self, id: &CardId, token: &str) -> String {
    format!("{}/public/{id}?data={token}", self.base_url)
  }

  /// The repository-backed card page, `<base>/card/<id>`.
  pub fn card_url(&self, id: &CardId) -> String { format!("{}/card/{id}", self.base_url) }

  pub async fn share(&self, card: &Card, mode: ShareMode) -> Result<SharePackage> {
    let token = codec::encode(card);
    let viewer_url = self.viewer_url(&card.id, &token);

    let mode = match mode {
      ShareMode::Auto if codec::fits_in_qr(&viewer_url, self.max_link_len) => ShareMode::Link,
      ShareMode::Auto => {
        info!(id = %card.id, len = viewer_url.len(), "viewer link too long; sharing as image");
        ShareMode::Image
      }
      explicit => explicit,
    };

    let (target, publication) = match mode {
      ShareMode::Image => {
        let image = self.renderer.render(card).await?;
        let publication = self.publisher.publish(image, upload_name(card)).await;
        (publication.url().to_owned(), Some(publication))
      }
      _ => (viewer_url.clone(), None),
    };

    let qr = self.qr.emit(&target).await?;
    let hosted = publication.as_ref().is_some_and(Publication::is_hosted);
    debug!(id = %card.id, ?mode, hosted, "card shared");

    Ok(SharePackage { mode, token, viewer_url, target, publication, qr })
  }
}
