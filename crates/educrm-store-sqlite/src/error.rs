//! Error type for `educrm-store-sqlite`.

use educrm_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain failures (not-found, stale ETag) raised by the store.
  #[error(transparent)]
  Core(#[from] educrm_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("invalid stored value: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Core(e) => e.kind(),
      // Rows that fail to decode count as storage faults.
      Self::Database(_) | Self::Uuid(_) | Self::DateParse(_) | Self::Decode(_) => {
        ErrorKind::StoreUnavailable
      }
    }
  }
}
