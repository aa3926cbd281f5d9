//! Pipeline stages and the status value stored on a prospect.
//!
//! The five stages are a fixed, known-in-advance set. Any stage may move to
//! any other stage (including itself); the order below is only the
//! conventional path a lead takes through the funnel.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::{Error, Result};

// ─── Stage ───────────────────────────────────────────────────────────────────

/// One of the five enrollment pipeline stages.
///
/// Serialised as its display label, which is also what the database stores.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum Stage {
  #[serde(rename = "Lead")]
  #[strum(serialize = "Lead")]
  Lead,
  #[serde(rename = "1º Contato")]
  #[strum(serialize = "1º Contato")]
  FirstContact,
  #[serde(rename = "Respondeu")]
  #[strum(serialize = "Respondeu")]
  Replied,
  #[serde(rename = "Visita Agendada")]
  #[strum(serialize = "Visita Agendada")]
  VisitScheduled,
  #[serde(rename = "Em Negociação")]
  #[strum(serialize = "Em Negociação")]
  Negotiating,
}

impl Stage {
  /// The stage every new prospect starts in.
  pub const INITIAL: Self = Self::Lead;

  /// All stages in pipeline order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// The label stored in the database and shown to users.
  pub fn label(self) -> &'static str { self.into() }

  /// The next stage along the conventional path, if any.
  pub fn next(self) -> Option<Self> {
    Self::iter().skip_while(|s| *s != self).nth(1)
  }

  /// The previous stage along the conventional path, if any.
  pub fn previous(self) -> Option<Self> {
    Self::iter().take_while(|s| *s != self).last()
  }

  /// Parse a requested status. Empty input and labels outside the five
  /// stages are both rejected.
  pub fn parse_requested(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(Error::InvalidArgument("status is required".into()));
    }
    Self::from_str(trimmed).map_err(|_| {
      Error::InvalidArgument(format!("unknown pipeline stage: {trimmed:?}"))
    })
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// The status column of a prospect as read back from storage.
///
/// Everything this system writes is a [`Stage`], but rows written by older
/// tooling may hold arbitrary text. Those are kept verbatim so they survive a
/// read/write cycle, and are left out of every pipeline bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
  Known(Stage),
  Unrecognized(String),
}

impl Status {
  pub fn stage(&self) -> Option<Stage> {
    match self {
      Self::Known(stage) => Some(*stage),
      Self::Unrecognized(_) => None,
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Known(stage) => stage.label(),
      Self::Unrecognized(raw) => raw,
    }
  }
}

impl From<Stage> for Status {
  fn from(stage: Stage) -> Self { Self::Known(stage) }
}

impl From<String> for Status {
  fn from(raw: String) -> Self {
    match Stage::from_str(&raw) {
      Ok(stage) => Self::Known(stage),
      Err(_) => Self::Unrecognized(raw),
    }
  }
}

impl From<Status> for String {
  fn from(status: Status) -> Self {
    match status {
      Status::Known(stage) => stage.label().to_owned(),
      Status::Unrecognized(raw) => raw,
    }
  }
}

impl PartialEq<Stage> for Status {
  fn eq(&self, other: &Stage) -> bool { self.stage() == Some(*other) }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
