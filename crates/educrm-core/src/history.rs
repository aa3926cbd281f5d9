//! Status history — the append-only log of pipeline transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage::Status;

/// Records one status transition of a prospect.
///
/// Written exactly once per transition and never updated or deleted. Entries
/// outlive the prospect they refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
  pub id:              Uuid,
  pub prospect_id:     Uuid,
  /// `None` only if the prospect had no status at all before the change.
  pub previous_status: Option<Status>,
  pub new_status:      Status,
  pub changed_at:      DateTime<Utc>,
}

impl StatusHistoryEntry {
  /// Whether this entry records a move to the stage the prospect was
  /// already in.
  pub fn is_self_transition(&self) -> bool {
    self.previous_status.as_ref() == Some(&self.new_status)
  }
}
