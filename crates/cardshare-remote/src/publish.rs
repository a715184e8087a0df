//! Publishing rendered cards: remote image hosts with an embedded fallback.

use async_trait::async_trait;
use cardshare_core::{
  Card, RasterImage,
  error::BoxError,
  fallback::{FallbackChain, Strategy},
};
use chrono::Utc;
use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Six months, the longest expiry the default host offers.
pub const DEFAULT_EXPIRATION_SECS: u64 = 15_552_000;

/// Upload name for a card image: `card_<stem>_<unix-millis>`.
pub fn upload_name(card: &Card) -> String {
  format!("card_{}_{}", card.file_stem(), Utc::now().timestamp_millis())
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
  pub image: RasterImage,
  pub name:  String,
}

/// Where a published image can be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Publication {
  /// Uploaded; `host` is the name of the strategy that accepted it.
  Hosted { url: String, host: String },
  /// Every host failed; the image travels inline.
  Embedded { data_url: String },
}

impl Publication {
  /// The hosted URL, or the data URL when embedded.
  pub fn url(&self) -> &str {
    match self {
      Publication::Hosted { url, .. } => url,
      Publication::Embedded { data_url } => data_url,
    }
  }

  pub fn is_hosted(&self) -> bool { matches!(self, Publication::Hosted { .. }) }
}

// ─── ImgBB-compatible host ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UploadResponse {
  #[serde(default)]
  success: bool,
  data:    Option<UploadData>,
  error:   Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
  url:        String,
  delete_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadError {
  message: Option<String>,
}

/// A host speaking the ImgBB upload protocol: a multipart POST carrying the
/// API key and the base64 payload, answered with a JSON envelope.
#[derive(Debug, Clone)]
pub struct ImgBbHost {
  client:     reqwest::Client,
  endpoint:   String,
  api_key:    String,
  expiration: Option<u64>,
}

impl ImgBbHost {
  pub fn new(
    client: reqwest::Client,
    endpoint: impl Into<String>,
    api_key: impl Into<String>,
  ) -> Self {
    Self {
      client,
      endpoint: endpoint.into(),
      api_key: api_key.into(),
      expiration: Some(DEFAULT_EXPIRATION_SECS),
    }
  }

  /// Override the expiry; `None` keeps the upload indefinitely.
  pub fn with_expiration(mut self, secs: Option<u64>) -> Self {
    self.expiration = secs;
    self
  }

  pub async fn upload(&self, req: &UploadRequest) -> Result<String> {
    let mut form = Form::new()
      .text("key", self.api_key.clone())
      .text("image", req.image.to_base64())
      .text("name", req.name.clone());
    if let Some(secs) = self.expiration {
      form = form.text("expiration", secs.to_string());
    }

    let resp = self.client.post(&self.endpoint).multipart(form).send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status(status));
    }

    let body: UploadResponse = resp.json().await?;
    match body.data {
      Some(data) if body.success && !data.url.is_empty() => {
        debug!(url = %data.url, delete_url = ?data.delete_url, "image uploaded");
        Ok(data.url)
      }
      _ => Err(Error::Rejected(
        body.error.and_then(|e| e.message).unwrap_or_else(|| "Unknown error".to_owned()),
      )),
    }
  }
}

#[async_trait]
impl Strategy<UploadRequest, String> for ImgBbHost {
  fn name(&self) -> &str { "imgbb" }

  async fn attempt(&self, req: &UploadRequest) -> std::result::Result<String, BoxError> {
    Ok(self.upload(req).await?)
  }
}

// ─── Publisher ───────────────────────────────────────────────────────────────

/// Publishes images through an ordered list of hosts. Publishing always
/// produces a [`Publication`].
#[derive(Default)]
pub struct ImagePublisher {
  hosts: FallbackChain<UploadRequest, String>,
}

impl ImagePublisher {
  pub fn new(hosts: FallbackChain<UploadRequest, String>) -> Self { Self { hosts } }

  /// A publisher with no hosts; every image is embedded.
  pub fn embedded_only() -> Self { Self::default() }

  pub fn host_names(&self) -> Vec<&str> { self.hosts.names() }

  pub async fn publish(&self, image: RasterImage, name: impl Into<String>) -> Publication {
    let req = UploadRequest { image, name: name.into() };
    if self.hosts.is_empty() {
      debug!(name = %req.name, "no image hosts configured; embedding");
      return Publication::Embedded { data_url: req.image.to_data_url() };
    }

    match self.hosts.run(&req).await {
      Ok(success) => {
        info!(host = %success.strategy, url = %success.value, "card image published");
        Publication::Hosted { url: success.value, host: success.strategy }
      }
      Err(exhausted) => {
        warn!(error = %exhausted, "every image host failed; embedding");
        Publication::Embedded { data_url: req.image.to_data_url() }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
  };

  use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
  };
  use serde_json::{Value, json};

  use super::*;
  use crate::test_support::{dead_url, serve};

  type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

  async fn record(State(seen): State<Seen>, mut form: Multipart) -> Json<Value> {
    let mut fields = HashMap::new();
    while let Some(field) = form.next_field().await.unwrap() {
      let name = field.name().unwrap().to_owned();
      fields.insert(name, field.text().await.unwrap());
    }
    let name = fields.get("name").cloned().unwrap_or_default();
    seen.lock().unwrap().push(fields);
    Json(json!({
      "success": true,
      "data": { "url": format!("https://i.example/{name}.png"), "delete_url": "https://del.example/1" }
    }))
  }

  async fn host(seen: Seen) -> String {
    serve(Router::new().route("/upload", post(record)).with_state(seen)).await
  }

  fn image() -> RasterImage { RasterImage::png(b"png-bytes".to_vec()) }

  fn imgbb(base: &str) -> ImgBbHost {
    ImgBbHost::new(reqwest::Client::new(), format!("{base}/upload"), "secret")
  }

  #[tokio::test]
  async fn uploads_multipart_fields() {
    let seen = Seen::default();
    let base = host(seen.clone()).await;
    let publisher = ImagePublisher::new(FallbackChain::new().with(imgbb(&base)));

    let publication = publisher.publish(image(), "card_Jane_Doe_1").await;
    assert_eq!(publication, Publication::Hosted {
      url:  "https://i.example/card_Jane_Doe_1.png".into(),
      host: "imgbb".into(),
    });
    assert!(publication.is_hosted());

    let fields = seen.lock().unwrap().pop().unwrap();
    assert_eq!(fields["key"], "secret");
    assert_eq!(fields["image"], image().to_base64());
    assert!(!fields["image"].starts_with("data:"));
    assert_eq!(fields["name"], "card_Jane_Doe_1");
    assert_eq!(fields["expiration"], "15552000");
  }

  #[tokio::test]
  async fn second_host_takes_over() {
    let seen = Seen::default();
    let good = host(seen.clone()).await;
    let publisher = ImagePublisher::new(
      FallbackChain::new().with(imgbb(&dead_url().await)).with(imgbb(&good)),
    );

    let publication = publisher.publish(image(), "n").await;
    assert_eq!(publication.url(), "https://i.example/n.png");
    assert_eq!(seen.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn rejection_and_errors_fall_back_to_embedding() {
    let app = Router::new()
      .route(
        "/rejects/upload",
        post(|| async {
          Json(json!({ "success": false, "error": { "message": "Invalid API key" } }))
        }),
      )
      .route("/fails/upload", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let base = serve(app).await;

    let rejecting = imgbb(&format!("{base}/rejects"));
    let err = rejecting.upload(&UploadRequest { image: image(), name: "n".into() }).await;
    assert!(matches!(err, Err(Error::Rejected(m)) if m == "Invalid API key"));

    let publisher = ImagePublisher::new(
      FallbackChain::new().with(rejecting).with(imgbb(&format!("{base}/fails"))),
    );
    let publication = publisher.publish(image(), "n").await;
    assert_eq!(publication, Publication::Embedded { data_url: image().to_data_url() });
    assert!(publication.url().starts_with("data:image/png;base64,"));
  }

  #[tokio::test]
  async fn no_hosts_embeds_without_network() {
    let publication = ImagePublisher::embedded_only().publish(image(), "n").await;
    assert!(!publication.is_hosted());
    assert_eq!(publication.url(), image().to_data_url());
  }

  #[test]
  fn publication_serializes_tagged_camel_case() {
    let p = Publication::Embedded { data_url: "data:x".into() };
    assert_eq!(serde_json::to_value(&p).unwrap(), json!({ "kind": "embedded", "dataUrl": "data:x" }));
  }
}
