//! Outbound HTTP for cardshare: publishing rendered cards to an image host
//! and fetching QR codes from remote generators.
//!
//! Both are built on [`cardshare_core::fallback::FallbackChain`]. The
//! publisher never fails (an exhausted chain degrades to an embedded data
//! URL); the QR emitter reports an error once every provider has failed.

pub mod error;
pub mod publish;
pub mod qr;

use std::time::Duration;

pub use error::{Error, Result};
pub use publish::{ImagePublisher, ImgBbHost, Publication, UploadRequest};
pub use qr::{GoogleChartsProvider, QrEmitter, QrRequest, QrServerProvider};

/// Build the shared HTTP client with a request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
  Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

#[cfg(test)]
pub(crate) mod test_support {
  use axum::Router;

  /// Serve `app` on an ephemeral local port and return its base URL.
  pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  /// A URL on which nothing is listening.
  pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
  }

  /// Smallest valid-looking PNG payload for stubs; clients never decode it.
  pub const PNG_STUB: &[u8] = b"\x89PNG\r\n\x1a\nstub";
}
