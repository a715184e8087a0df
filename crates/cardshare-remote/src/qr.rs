//! QR codes from remote generators, primary first.

use std::path::Path;

use async_trait::async_trait;
use cardshare_core::{
  RasterImage,
  codec::QR_SAFE_PAYLOAD_LEN,
  error::BoxError,
  fallback::{FallbackChain, Strategy},
  raster::PNG,
};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::{Error, Result};

pub const DEFAULT_SIZE: u32 = 256;
pub const QR_SERVER_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const GOOGLE_CHARTS_ENDPOINT: &str = "https://chart.googleapis.com/chart";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
  pub text: String,
  /// Edge length in pixels; codes are square.
  pub size: u32,
}

impl QrRequest {
  fn dimensions(&self) -> String { format!("{0}x{0}", self.size) }
}

/// Send a prepared provider request and accept only a non-empty 2xx body.
async fn fetch_image(request: reqwest::RequestBuilder) -> Result<RasterImage> {
  let resp = request.send().await?;
  let status = resp.status();
  if !status.is_success() {
    return Err(Error::Status(status));
  }
  let media_type = resp
    .headers()
    .get(CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .filter(|v| v.starts_with("image/"))
    .unwrap_or(PNG)
    .to_owned();
  let data = resp.bytes().await?;
  if data.is_empty() {
    return Err(Error::Rejected("empty response body".into()));
  }
  Ok(RasterImage { data, media_type })
}

// ─── Providers ───────────────────────────────────────────────────────────────

/// The goqr.me "QR Server" API.
#[derive(Debug, Clone)]
pub struct QrServerProvider {
  client:   reqwest::Client,
  endpoint: String,
}

impl QrServerProvider {
  pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
    Self { client, endpoint: endpoint.into() }
  }
}

#[async_trait]
impl Strategy<QrRequest, RasterImage> for QrServerProvider {
  fn name(&self) -> &str { "qrserver" }

  async fn attempt(&self, req: &QrRequest) -> std::result::Result<RasterImage, BoxError> {
    let request = self.client.get(&self.endpoint).query(&[
      ("size", req.dimensions().as_str()),
      ("data", req.text.as_str()),
      ("format", "png"),
      ("ecc", "M"),
      ("margin", "10"),
    ]);
    Ok(fetch_image(request).await?)
  }
}

/// The Google Charts QR endpoint.
#[derive(Debug, Clone)]
pub struct GoogleChartsProvider {
  client:   reqwest::Client,
  endpoint: String,
}

impl GoogleChartsProvider {
  pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
    Self { client, endpoint: endpoint.into() }
  }
}

#[async_trait]
impl Strategy<QrRequest, RasterImage> for GoogleChartsProvider {
  fn name(&self) -> &str { "google-charts" }

  async fn attempt(&self, req: &QrRequest) -> std::result::Result<RasterImage, BoxError> {
    let request = self.client.get(&self.endpoint).query(&[
      ("chs", req.dimensions().as_str()),
      ("cht", "qr"),
      ("chl", req.text.as_str()),
      ("choe", "UTF-8"),
    ]);
    Ok(fetch_image(request).await?)
  }
}

// ─── Emitter ─────────────────────────────────────────────────────────────────

pub struct QrEmitter {
  providers:    FallbackChain<QrRequest, RasterImage>,
  default_size: u32,
}

impl QrEmitter {
  pub fn new(providers: FallbackChain<QrRequest, RasterImage>, default_size: u32) -> Self {
    Self { providers, default_size }
  }

  /// QR Server first, Google Charts second.
  pub fn standard(
    client: reqwest::Client,
    primary_endpoint: &str,
    fallback_endpoint: &str,
    default_size: u32,
  ) -> Self {
    let chain = FallbackChain::new()
      .with(QrServerProvider::new(client.clone(), primary_endpoint))
      .with(GoogleChartsProvider::new(client, fallback_endpoint));
    Self::new(chain, default_size)
  }

  pub fn default_size(&self) -> u32 { self.default_size }

  pub fn provider_names(&self) -> Vec<&str> { self.providers.names() }

  /// Encode `text` at the default size.
  pub async fn emit(&self, text: &str) -> Result<RasterImage> {
    self.emit_sized(text, self.default_size).await
  }

  pub async fn emit_sized(&self, text: &str, size: u32) -> Result<RasterImage> {
    if text.is_empty() {
      return Err(Error::EmptyPayload);
    }
    let chars = text.chars().count();
    if chars > QR_SAFE_PAYLOAD_LEN {
      warn!(chars, limit = QR_SAFE_PAYLOAD_LEN, "qr payload may not scan reliably");
    }

    let req = QrRequest { text: text.to_owned(), size };
    let success = self.providers.run(&req).await?;
    debug!(provider = %success.strategy, bytes = success.value.len(), "qr code generated");
    Ok(success.value)
  }

  /// Generate a QR code and write it to `path`.
  pub async fn download(&self, text: &str, path: impl AsRef<Path>, size: u32) -> Result<()> {
    let image = self.emit_sized(text, size).await?;
    tokio::fs::write(path.as_ref(), &image.data).await?;
    debug!(path = %path.as_ref().display(), "qr code saved");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
  };

  use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
  };

  use super::*;
  use crate::test_support::{PNG_STUB, dead_url, serve};

  type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

  async fn png(
    State(seen): State<Seen>,
    Query(q): Query<HashMap<String, String>>,
  ) -> impl IntoResponse {
    seen.lock().unwrap().push(q);
    ([(header::CONTENT_TYPE, "image/png")], PNG_STUB)
  }

  async fn stub(seen: Seen) -> String {
    let app = Router::new()
      .route("/ok", get(png))
      .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
      .route("/empty", get(|| async { StatusCode::OK }))
      .with_state(seen);
    serve(app).await
  }

  fn emitter(primary: &str, fallback: &str) -> QrEmitter {
    QrEmitter::standard(reqwest::Client::new(), primary, fallback, DEFAULT_SIZE)
  }

  #[tokio::test]
  async fn primary_provider_parameters() {
    let seen = Seen::default();
    let base = stub(seen.clone()).await;
    let qr = emitter(&format!("{base}/ok"), &format!("{base}/down"));

    let image = qr.emit("https://example.com/public/a?data=x y&z").await.unwrap();
    assert_eq!(&image.data[..], PNG_STUB);
    assert_eq!(image.media_type, "image/png");

    let q = seen.lock().unwrap().pop().unwrap();
    assert_eq!(q["size"], "256x256");
    assert_eq!(q["data"], "https://example.com/public/a?data=x y&z");
    assert_eq!(q["format"], "png");
    assert_eq!(q["ecc"], "M");
    assert_eq!(q["margin"], "10");
  }

  #[tokio::test]
  async fn falls_back_to_second_provider() {
    let seen = Seen::default();
    let base = stub(seen.clone()).await;
    let qr = emitter(&format!("{base}/down"), &format!("{base}/ok"));

    qr.emit_sized("hello", 300).await.unwrap();
    let q = seen.lock().unwrap().pop().unwrap();
    assert_eq!(q["chs"], "300x300");
    assert_eq!(q["cht"], "qr");
    assert_eq!(q["chl"], "hello");
    assert_eq!(q["choe"], "UTF-8");
  }

  #[tokio::test]
  async fn empty_body_counts_as_failure() {
    let base = stub(Seen::default()).await;
    let qr = emitter(&format!("{base}/empty"), &dead_url().await);
    let exhausted = match qr.emit("hello").await {
      Err(Error::Exhausted(exhausted)) => exhausted,
      other => panic!("unexpected {other:?}"),
    };
    assert_eq!(exhausted.failures.len(), 2);
    assert_eq!(exhausted.failures[0].strategy, "qrserver");
    assert_eq!(exhausted.failures[1].strategy, "google-charts");
  }

  #[tokio::test]
  async fn empty_text_is_rejected_before_any_request() {
    let seen = Seen::default();
    let base = stub(seen.clone()).await;
    let qr = emitter(&format!("{base}/ok"), &format!("{base}/ok"));
    assert!(matches!(qr.emit("").await, Err(Error::EmptyPayload)));
    assert!(seen.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn oversized_text_is_still_attempted() {
    let seen = Seen::default();
    let base = stub(seen.clone()).await;
    let qr = emitter(&format!("{base}/ok"), &format!("{base}/ok"));
    qr.emit(&"x".repeat(QR_SAFE_PAYLOAD_LEN + 1)).await.unwrap();
    assert_eq!(seen.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn download_writes_file() {
    let base = stub(Seen::default()).await;
    let qr = emitter(&format!("{base}/ok"), &format!("{base}/ok"));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qr.png");

    qr.download("hello", &path, 128).await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), PNG_STUB);
  }
}
