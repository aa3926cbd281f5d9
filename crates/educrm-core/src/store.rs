//! The `EnrollmentStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `educrm-store-sqlite`).
//! Higher layers (`educrm-api`, `educrm-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  error::Classify,
  history::StatusHistoryEntry,
  prospect::{NewProspect, Prospect, ProspectEdit},
  section::ClassSection,
  transition::{AppliedTransition, StatusChange},
};

/// Abstraction over an EduCRM record store backend.
///
/// Status history is append-only: the only way to add an entry is a status
/// change, and nothing removes one. A status change and its history entry
/// are written atomically.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EnrollmentStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Prospects ─────────────────────────────────────────────────────────

  /// All prospects, newest-created first.
  fn list_prospects(
    &self,
  ) -> impl Future<Output = Result<Vec<Prospect>, Self::Error>> + Send + '_;

  /// Retrieve a prospect by id. Returns `None` if not found.
  fn get_prospect(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Prospect>, Self::Error>> + Send + '_;

  /// Persist a new prospect in the initial stage. No history entry is
  /// written.
  fn create_prospect(
    &self,
    input: NewProspect,
  ) -> impl Future<Output = Result<Prospect, Self::Error>> + Send + '_;

  /// Replace a prospect's contact details. A differing status in `edit` is
  /// applied and historicised in the same transaction.
  fn update_prospect(
    &self,
    id: Uuid,
    edit: ProspectEdit,
  ) -> impl Future<Output = Result<Prospect, Self::Error>> + Send + '_;

  /// Delete a prospect. Its history entries are kept.
  fn delete_prospect(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Status transitions ────────────────────────────────────────────────

  /// Move a prospect to a new stage and append the matching history entry.
  ///
  /// Changes to the same prospect are serialised: two concurrent calls both
  /// succeed, in some order, and both are recorded.
  fn change_status(
    &self,
    change: StatusChange,
  ) -> impl Future<Output = Result<AppliedTransition, Self::Error>> + Send + '_;

  /// History for a prospect, newest first. Entries of a deleted prospect are
  /// still returned. Errors only if the id has neither a prospect nor any
  /// history.
  fn list_history(
    &self,
    prospect_id: Uuid,
  ) -> impl Future<Output = Result<Vec<StatusHistoryEntry>, Self::Error>> + Send + '_;

  // ── Class sections ────────────────────────────────────────────────────

  /// All sections, ordered by series then section label.
  fn list_sections(
    &self,
  ) -> impl Future<Output = Result<Vec<ClassSection>, Self::Error>> + Send + '_;

  /// Retrieve a section by id. Returns `None` if not found.
  fn get_section(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ClassSection>, Self::Error>> + Send + '_;

  /// Overwrite a section's enrolled count. Counts above the seat total are
  /// accepted.
  fn update_enrollment(
    &self,
    id: Uuid,
    enrolled_count: u32,
  ) -> impl Future<Output = Result<ClassSection, Self::Error>> + Send + '_;
}
