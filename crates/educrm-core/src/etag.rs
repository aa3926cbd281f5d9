//! ETag computation for prospect resources.
//!
//! A prospect's ETag is a SHA-256 over its id and `updated_at`. Every write
//! path touches `updated_at`, so the tag changes whenever the record does.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::prospect::Prospect;

/// Compute the quoted ETag for `prospect`.
pub fn prospect_etag(prospect: &Prospect) -> String {
  etag_from_parts(prospect.id, prospect.updated_at)
}

/// Compute an ETag directly from a prospect id and its `updated_at`.
pub fn etag_from_parts(id: Uuid, updated_at: DateTime<Utc>) -> String {
  let mut hasher = Sha256::new();
  hasher.update(id.as_bytes());
  hasher.update(updated_at.timestamp_micros().to_le_bytes());
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Compare two ETags, ignoring surrounding quotes and a weak `W/` prefix.
/// Some clients send If-Match without the quotes.
pub fn etags_match(a: &str, b: &str) -> bool { strip(a) == strip(b) }

fn strip(tag: &str) -> &str {
  let tag = tag.trim();
  let tag = tag.strip_prefix("W/").unwrap_or(tag);
  tag.trim_matches('"')
}
