//! Status transitions.
//!
//! There is no transition graph: any stage may follow any other, and a move
//! to the current stage is still a transition that gets its own history
//! entry.

use uuid::Uuid;

use crate::{
  Result,
  history::StatusHistoryEntry,
  prospect::Prospect,
  stage::Stage,
};

/// Input to [`crate::store::EnrollmentStore::change_status`].
#[derive(Debug, Clone)]
pub struct StatusChange {
  pub prospect_id: Uuid,
  pub new_status:  Stage,
  /// If set, the change is applied only while the stored prospect still has
  /// this ETag. See [`crate::etag::prospect_etag`].
  pub if_match:    Option<String>,
}

impl StatusChange {
  pub fn new(prospect_id: Uuid, new_status: Stage) -> Self {
    Self { prospect_id, new_status, if_match: None }
  }

  /// Build a change from a raw, user-supplied status label.
  pub fn parse(prospect_id: Uuid, raw_status: &str) -> Result<Self> {
    Ok(Self::new(prospect_id, Stage::parse_requested(raw_status)?))
  }

  pub fn with_if_match(mut self, etag: Option<String>) -> Self {
    self.if_match = etag;
    self
  }
}

/// The result of an applied transition: the freshly re-read prospect and the
/// history entry that was appended alongside it.
#[derive(Debug, Clone)]
pub struct AppliedTransition {
  pub prospect: Prospect,
  pub entry:    StatusHistoryEntry,
}
