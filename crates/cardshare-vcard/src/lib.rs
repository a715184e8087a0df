//! Downloadable contact files for cardshare.
//!
//! Converts a [`Card`] into a vCard 3.0 document that standard contact-import
//! tooling understands. Pure and synchronous.
//!
//! ```no_run
//! # fn demo(card: &cardshare_core::Card) {
//! let vcf = cardshare_vcard::serialize(card);
//! let name = cardshare_vcard::file_name(card);
//! # }
//! ```

mod serialize;

use cardshare_core::Card;

/// MIME type of a serialized contact file.
pub const CONTENT_TYPE: &str = "text/vcard";

/// Serialize `card` as a single vCard 3.0 with CRLF line endings.
pub fn serialize(card: &Card) -> String { serialize::to_vcard(card) }

/// Download name for the contact file, e.g. `Jane_Doe.vcf`.
pub fn file_name(card: &Card) -> String { format!("{}.vcf", card.file_stem()) }
