//! Core types for the cardshare pipeline.
//!
//! Holds the card record, the tiered repository and its `Tier` seam, the
//! transport codec, and the fallback-chain combinator shared by the remote
//! publishers. This crate has no HTTP or database dependencies; storage
//! backends and network clients live in their own crates and plug in through
//! [`tier::Tier`] and [`fallback::Strategy`].

pub mod card;
pub mod codec;
pub mod error;
pub mod fallback;
pub mod raster;
pub mod repository;
pub mod theme;
pub mod tier;
pub mod viewer;

pub use card::{Card, CardDraft, CardId};
pub use error::{Error, ImageRejection, MAX_PROFILE_IMAGE_BYTES, Result, ValidationError};
pub use raster::RasterImage;
pub use repository::Repository;
pub use theme::Theme;
