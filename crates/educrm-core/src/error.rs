//! Error types for `educrm-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("prospect not found: {0}")]
  ProspectNotFound(Uuid),

  #[error("class section not found: {0}")]
  SectionNotFound(Uuid),

  #[error("prospect {0} was modified since it was last read")]
  PreconditionFailed(Uuid),

  #[error("occupancy is undefined for a section with zero seats")]
  DivisionByZero,

  #[error("store unavailable: {0}")]
  StoreUnavailable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The coarse category of a failure, independent of which crate raised it.
///
/// Transport layers map these onto their own status codes; nothing else
/// should need to match on concrete error variants across crate boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  InvalidArgument,
  NotFound,
  PreconditionFailed,
  StoreUnavailable,
  DivisionByZero,
}

/// Implemented by every error type that can surface from an
/// [`EnrollmentStore`](crate::store::EnrollmentStore).
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
      Self::ProspectNotFound(_) | Self::SectionNotFound(_) => ErrorKind::NotFound,
      Self::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
      Self::DivisionByZero => ErrorKind::DivisionByZero,
      Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
    }
  }
}
