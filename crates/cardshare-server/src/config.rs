//! Runtime configuration: `cardshare.toml` layered under `CARDSHARE_*`
//! environment variables (`__` separates nested keys).

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const ENV_PREFIX: &str = "CARDSHARE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Public origin used in viewer links and QR targets.
  pub base_url:   String,
  pub storage:    StorageConfig,
  pub image_host: ImageHostConfig,
  pub qr:         QrConfig,
  pub share:      ShareConfig,
  pub render:     RenderConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".into(),
      port:       8080,
      base_url:   "http://localhost:8080".into(),
      storage:    StorageConfig::default(),
      image_host: ImageHostConfig::default(),
      qr:         QrConfig::default(),
      share:      ShareConfig::default(),
      render:     RenderConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (optional) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  pub data_dir:            PathBuf,
  pub durable_quota_bytes: u64,
  pub database:            PathBuf,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      data_dir:            PathBuf::from("./data/cards"),
      durable_quota_bytes: 5 * 1024 * 1024,
      database:            PathBuf::from("./data/cards.sqlite"),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageHostConfig {
  pub endpoint:        String,
  /// Without a key no host is configured and images are always embedded.
  pub api_key:         Option<String>,
  pub expiration_secs: Option<u64>,
}

impl Default for ImageHostConfig {
  fn default() -> Self {
    Self {
      endpoint:        "https://api.imgbb.com/1/upload".into(),
      api_key:         None,
      expiration_secs: Some(cardshare_remote::publish::DEFAULT_EXPIRATION_SECS),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QrConfig {
  pub primary_endpoint:  String,
  pub fallback_endpoint: String,
  pub size:              u32,
  pub timeout_secs:      u64,
}

impl Default for QrConfig {
  fn default() -> Self {
    Self {
      primary_endpoint:  cardshare_remote::qr::QR_SERVER_ENDPOINT.into(),
      fallback_endpoint: cardshare_remote::qr::GOOGLE_CHARTS_ENDPOINT.into(),
      size:              cardshare_remote::qr::DEFAULT_SIZE,
      timeout_secs:      30,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
  /// Longest viewer link the `auto` mode will put in a QR code.
  pub max_link_len: usize,
}

impl Default for ShareConfig {
  fn default() -> Self { Self { max_link_len: cardshare_core::codec::QR_SAFE_PAYLOAD_LEN } }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
  pub font_regular: Option<PathBuf>,
  pub font_bold:    Option<PathBuf>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.storage.durable_quota_bytes, 5 * 1024 * 1024);
    assert_eq!(cfg.qr.size, 256);
    assert_eq!(cfg.share.max_link_len, 2000);
    assert!(cfg.image_host.api_key.is_none());
  }

  #[test]
  fn file_overrides_nested_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cardshare.toml");
    std::fs::write(
      &path,
      r#"
        port = 9000
        base_url = "https://cards.example"

        [image_host]
        api_key = "k"

        [qr]
        size = 512
      "#,
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.base_url, "https://cards.example");
    assert_eq!(cfg.image_host.api_key.as_deref(), Some("k"));
    assert_eq!(cfg.image_host.endpoint, "https://api.imgbb.com/1/upload");
    assert_eq!(cfg.qr.size, 512);
    assert_eq!(cfg.qr.timeout_secs, 30);
  }
}
