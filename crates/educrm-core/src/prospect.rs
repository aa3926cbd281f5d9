//! Prospect — a student lead moving through the enrollment pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  stage::{Stage, Status},
};

// ─── Prospect ────────────────────────────────────────────────────────────────

/// A persisted prospect record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
  pub id:                Uuid,
  pub student_name:      String,
  /// Free-text class label the student is applying for, e.g. "3º Ano".
  pub grade:             String,
  pub parent_name:       String,
  pub phone:             String,
  pub email:             String,
  pub status:            Status,
  pub observation:       Option<String>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
  /// Moment of the most recent status change; `None` until the first one.
  #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
  pub last_contact_date: Option<DateTime<Utc>>,
}

// ─── Contact details ─────────────────────────────────────────────────────────

/// The intake fields shared by creation and full edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
  pub student_name: String,
  pub grade:        String,
  pub parent_name:  String,
  pub phone:        String,
  pub email:        String,
  pub observation:  Option<String>,
}

impl ContactDetails {
  /// Trim every field, drop a blank observation, and reject blank required
  /// fields. The error names every missing field at once.
  pub fn normalized(self) -> Result<Self> {
    let Self { student_name, grade, parent_name, phone, email, observation } =
      self;

    let required = [
      ("studentName", student_name.trim().to_owned()),
      ("grade", grade.trim().to_owned()),
      ("parentName", parent_name.trim().to_owned()),
      ("phone", phone.trim().to_owned()),
      ("email", email.trim().to_owned()),
    ];

    let missing: Vec<&str> = required
      .iter()
      .filter(|(_, value)| value.is_empty())
      .map(|(name, _)| *name)
      .collect();
    if !missing.is_empty() {
      return Err(Error::InvalidArgument(format!(
        "required fields missing: {}",
        missing.join(", ")
      )));
    }

    let [student_name, grade, parent_name, phone, email] =
      required.map(|(_, value)| value);

    Ok(Self {
      student_name,
      grade,
      parent_name,
      phone,
      email,
      observation: observation
        .map(|o| o.trim().to_owned())
        .filter(|o| !o.is_empty()),
    })
  }
}

// ─── NewProspect ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::EnrollmentStore::create_prospect`].
///
/// Status, identity and timestamps are always assigned by the store: every
/// new prospect starts at [`Stage::INITIAL`] and has no history.
#[derive(Debug, Clone)]
pub struct NewProspect {
  pub details: ContactDetails,
}

impl NewProspect {
  pub fn new(details: ContactDetails) -> Result<Self> {
    Ok(Self { details: details.normalized()? })
  }

  pub fn initial_status(&self) -> Stage { Stage::INITIAL }
}

// ─── ProspectEdit ────────────────────────────────────────────────────────────

/// Input to [`crate::store::EnrollmentStore::update_prospect`]: a full
/// replacement of the contact details, optionally with a new status.
///
/// A status that differs from the stored one is applied through the same
/// path as [`crate::store::EnrollmentStore::change_status`], so it is
/// recorded in the status history.
#[derive(Debug, Clone)]
pub struct ProspectEdit {
  pub details:     ContactDetails,
  pub status:      Option<Stage>,
  /// ETag the caller last observed; see [`crate::etag`].
  pub if_match:    Option<String>,
}

impl ProspectEdit {
  pub fn new(details: ContactDetails, status: Option<Stage>) -> Result<Self> {
    Ok(Self { details: details.normalized()?, status, if_match: None })
  }

  pub fn with_if_match(mut self, etag: Option<String>) -> Self {
    self.if_match = etag;
    self
  }
}
