//! Durable storage tiers for the cardshare repository.
//!
//! - [`DirTier`] keeps one file per key under a directory and enforces a byte
//!   quota, like a browser's per-origin store.
//! - [`SqliteTier`] keeps every key in a single SQLite table and has no quota;
//!   it is the high-capacity tier for records carrying inline images.
//!
//! Both implement [`cardshare_core::tier::Tier`].

mod dir;
mod schema;
mod sqlite;

pub mod error;

pub use dir::DirTier;
pub use error::{Error, Result};
pub use sqlite::SqliteTier;
