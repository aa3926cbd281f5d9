//! Class sections and the capacity calculator.
//!
//! `enrolled` is allowed to exceed `total_seats`. Over-capacity sections are
//! real data that must be displayed, so nothing here clamps or rejects them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Period ──────────────────────────────────────────────────────────────────

/// The shift a section meets in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
  #[serde(rename = "Manhã")]
  Morning,
  #[serde(rename = "Tarde")]
  Afternoon,
}

impl Period {
  pub fn label(self) -> &'static str {
    match self {
      Self::Morning => "Manhã",
      Self::Afternoon => "Tarde",
    }
  }

  pub fn from_label(s: &str) -> Option<Self> {
    match s {
      "Manhã" => Some(Self::Morning),
      "Tarde" => Some(Self::Afternoon),
      _ => None,
    }
  }
}

// ─── ClassSection ────────────────────────────────────────────────────────────

/// A concrete class offering with a seat capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSection {
  pub id:             Uuid,
  /// Series or grade, e.g. "MAT1" or "6º Ano".
  pub series:         String,
  /// Section label within the series, e.g. "M1A" or "611".
  pub label:          String,
  pub enrolled_count: u32,
  pub total_seats:    u32,
  pub period:         Option<Period>,
}

impl ClassSection {
  pub fn capacity(&self) -> Result<Capacity> {
    Capacity::compute(self.enrolled_count, self.total_seats)
  }
}

// ─── Capacity ────────────────────────────────────────────────────────────────

/// Occupancy bucket used to colour sections on the dashboard.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
  Normal,
  Warning,
  Critical,
}

impl RiskTier {
  pub const WARNING_AT: u64 = 70;
  pub const CRITICAL_AT: u64 = 90;

  /// Tier for an occupancy percentage. Lower bounds are inclusive.
  pub fn for_occupancy(percent: u64) -> Self {
    if percent >= Self::CRITICAL_AT {
      Self::Critical
    } else if percent >= Self::WARNING_AT {
      Self::Warning
    } else {
      Self::Normal
    }
  }
}

/// Derived, display-ready seat figures for a section. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
  /// `total_seats - enrolled`; negative when the section is over capacity.
  pub available:         i64,
  /// `enrolled / total_seats * 100`, rounded half up.
  pub occupancy_percent: u64,
  pub risk_tier:         RiskTier,
}

impl Capacity {
  pub fn compute(enrolled: u32, total_seats: u32) -> Result<Self> {
    if total_seats == 0 {
      return Err(Error::DivisionByZero);
    }

    let enrolled = u64::from(enrolled);
    let total = u64::from(total_seats);
    // round(e * 100 / t) == floor((200e + t) / 2t) for non-negative inputs.
    let occupancy_percent = (enrolled * 200 + total) / (total * 2);

    Ok(Self {
      available: total as i64 - enrolled as i64,
      occupancy_percent,
      risk_tier: RiskTier::for_occupancy(occupancy_percent),
    })
  }

  pub fn is_full(&self) -> bool { self.available == 0 }

  pub fn is_over_capacity(&self) -> bool { self.available < 0 }
}
