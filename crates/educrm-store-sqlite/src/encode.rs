//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width,
//! so lexicographic order in SQL matches chronological order. The last
//! contact moment is stored as epoch milliseconds. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use educrm_core::{
  history::StatusHistoryEntry,
  prospect::Prospect,
  section::{ClassSection, Period},
  stage::Status,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current instant at the precision the store persists.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_millis(dt: DateTime<Utc>) -> i64 { dt.timestamp_millis() }

pub fn decode_millis(ms: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp_millis(ms)
    .ok_or_else(|| Error::DateParse(format!("epoch millis out of range: {ms}")))
}

// ─── Period ──────────────────────────────────────────────────────────────────

pub fn decode_period(s: &str) -> Result<Period> {
  Period::from_label(s)
    .ok_or_else(|| Error::Decode(format!("unknown period: {s:?}")))
}

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn decode_count(column: &str, n: i64) -> Result<u32> {
  u32::try_from(n)
    .map_err(|_| Error::Decode(format!("{column} out of range: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawProspect::from_row`].
pub const PROSPECT_COLUMNS: &str = "prospect_id, student_name, grade, \
  parent_name, phone, email, status, observation, created_at, updated_at, \
  last_contact_ms";

/// Raw values read directly from a `prospects` row.
#[derive(Debug)]
pub struct RawProspect {
  pub prospect_id:     String,
  pub student_name:    String,
  pub grade:           String,
  pub parent_name:     String,
  pub phone:           String,
  pub email:           String,
  pub status:          String,
  pub observation:     Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
  pub last_contact_ms: Option<i64>,
}

impl RawProspect {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      prospect_id:     row.get(0)?,
      student_name:    row.get(1)?,
      grade:           row.get(2)?,
      parent_name:     row.get(3)?,
      phone:           row.get(4)?,
      email:           row.get(5)?,
      status:          row.get(6)?,
      observation:     row.get(7)?,
      created_at:      row.get(8)?,
      updated_at:      row.get(9)?,
      last_contact_ms: row.get(10)?,
    })
  }

  pub fn into_prospect(self) -> Result<Prospect> {
    Ok(Prospect {
      id:                decode_uuid(&self.prospect_id)?,
      student_name:      self.student_name,
      grade:             self.grade,
      parent_name:       self.parent_name,
      phone:             self.phone,
      email:             self.email,
      status:            Status::from(self.status),
      observation:       self.observation,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
      last_contact_date: self.last_contact_ms.map(decode_millis).transpose()?,
    })
  }
}

/// Column list matching [`RawSection::from_row`].
pub const SECTION_COLUMNS: &str =
  "section_id, series, label, enrolled_count, total_seats, period";

/// Raw values read directly from a `class_sections` row.
#[derive(Debug)]
pub struct RawSection {
  pub section_id:     String,
  pub series:         String,
  pub label:          String,
  pub enrolled_count: i64,
  pub total_seats:    i64,
  pub period:         Option<String>,
}

impl RawSection {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      section_id:     row.get(0)?,
      series:         row.get(1)?,
      label:          row.get(2)?,
      enrolled_count: row.get(3)?,
      total_seats:    row.get(4)?,
      period:         row.get(5)?,
    })
  }

  pub fn into_section(self) -> Result<ClassSection> {
    Ok(ClassSection {
      id:             decode_uuid(&self.section_id)?,
      series:         self.series,
      label:          self.label,
      enrolled_count: decode_count("enrolled_count", self.enrolled_count)?,
      total_seats:    decode_count("total_seats", self.total_seats)?,
      period:         self.period.as_deref().map(decode_period).transpose()?,
    })
  }
}

/// Column list matching [`RawHistoryEntry::from_row`].
pub const HISTORY_COLUMNS: &str =
  "entry_id, prospect_id, previous_status, new_status, changed_at";

/// Raw values read directly from a `status_history` row.
#[derive(Debug)]
pub struct RawHistoryEntry {
  pub entry_id:        String,
  pub prospect_id:     String,
  pub previous_status: Option<String>,
  pub new_status:      String,
  pub changed_at:      String,
}

impl RawHistoryEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:        row.get(0)?,
      prospect_id:     row.get(1)?,
      previous_status: row.get(2)?,
      new_status:      row.get(3)?,
      changed_at:      row.get(4)?,
    })
  }

  pub fn into_entry(self) -> Result<StatusHistoryEntry> {
    Ok(StatusHistoryEntry {
      id:              decode_uuid(&self.entry_id)?,
      prospect_id:     decode_uuid(&self.prospect_id)?,
      previous_status: self.previous_status.map(Status::from),
      new_status:      Status::from(self.new_status),
      changed_at:      decode_dt(&self.changed_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let whole = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let later = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
    assert!(encode_dt(whole) < encode_dt(later));
    assert_eq!(encode_dt(whole), "2023-11-14T22:13:20.000000Z");
  }

  #[test]
  fn timestamps_round_trip_at_stored_precision() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn negative_counts_are_rejected() {
    assert!(matches!(decode_count("enrolled_count", -1), Err(Error::Decode(_))));
    assert_eq!(decode_count("total_seats", 18).unwrap(), 18);
  }
}
