//! [`SqliteStore`] — the SQLite implementation of [`EnrollmentStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use educrm_core::{
  Error as CoreError,
  etag::{etag_from_parts, etags_match},
  history::StatusHistoryEntry,
  prospect::{NewProspect, Prospect, ProspectEdit},
  section::ClassSection,
  stage::{Stage, Status},
  store::EnrollmentStore,
  transition::{AppliedTransition, StatusChange},
};

use crate::{
  encode::{
    decode_dt, encode_dt, encode_millis, encode_uuid, now, RawHistoryEntry,
    RawProspect, RawSection, HISTORY_COLUMNS, PROSPECT_COLUMNS,
    SECTION_COLUMNS,
  },
  schema::SCHEMA,
  seed::seed_sections_if_empty,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An EduCRM record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// runs on the connection's one background thread, in submission order.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and seed
  /// the class sections if the table is empty.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  async fn init(&self) -> Result<()> {
    let inserted = self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(seed_sections_if_empty(conn)?)
      })
      .await?;

    if inserted > 0 {
      tracing::info!(inserted, "seeded class sections");
    }
    Ok(())
  }

  /// Run arbitrary SQL, bypassing the trait's invariants.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    Ok(self.conn.call(move |conn| Ok(conn.execute(sql, [])?)).await?)
  }

  /// Count history rows for `prospect_id`, whether or not the prospect
  /// still exists.
  #[cfg(test)]
  pub(crate) async fn history_rows_for(&self, prospect_id: Uuid) -> Result<i64> {
    let id = encode_uuid(prospect_id);
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            "SELECT COUNT(*) FROM status_history WHERE prospect_id = ?1",
            rusqlite::params![id],
            |r| r.get(0),
          )?)
        })
        .await?,
    )
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────

/// Outcome of a guarded write attempted inside a transaction.
enum Guarded<T> {
  Missing,
  Stale,
  Done(T),
}

/// Read the current status of a prospect and check the caller's ETag, if any.
fn lock_prospect(
  conn:     &rusqlite::Connection,
  id:       Uuid,
  if_match: Option<&str>,
) -> tokio_rusqlite::Result<Guarded<String>> {
  let row: Option<(String, String)> = conn
    .query_row(
      "SELECT status, updated_at FROM prospects WHERE prospect_id = ?1",
      rusqlite::params![encode_uuid(id)],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;

  let Some((status, updated_at)) = row else {
    return Ok(Guarded::Missing);
  };

  if let Some(expected) = if_match {
    let updated_at = decode_dt(&updated_at)
      .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
    if !etags_match(&etag_from_parts(id, updated_at), expected) {
      return Ok(Guarded::Stale);
    }
  }

  Ok(Guarded::Done(status))
}

/// Write a new status onto a prospect and append the matching history row.
/// Must run inside the same transaction as [`lock_prospect`].
fn apply_transition(
  conn:     &rusqlite::Connection,
  entry_id: Uuid,
  id:       Uuid,
  previous: &str,
  next:     Stage,
  at:       DateTime<Utc>,
) -> rusqlite::Result<()> {
  let id_str = encode_uuid(id);
  let at_str = encode_dt(at);

  conn.execute(
    "UPDATE prospects
     SET status = ?1, last_contact_ms = ?2, updated_at = ?3
     WHERE prospect_id = ?4",
    rusqlite::params![next.label(), encode_millis(at), at_str, id_str],
  )?;

  conn.execute(
    "INSERT INTO status_history
       (entry_id, prospect_id, previous_status, new_status, changed_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(entry_id),
      id_str,
      previous,
      next.label(),
      at_str
    ],
  )?;

  Ok(())
}

fn select_prospect(
  conn: &rusqlite::Connection,
  id:   Uuid,
) -> rusqlite::Result<Option<RawProspect>> {
  conn
    .query_row(
      &format!("SELECT {PROSPECT_COLUMNS} FROM prospects WHERE prospect_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawProspect::from_row,
    )
    .optional()
}

fn select_section(
  conn: &rusqlite::Connection,
  id:   Uuid,
) -> rusqlite::Result<Option<RawSection>> {
  conn
    .query_row(
      &format!("SELECT {SECTION_COLUMNS} FROM class_sections WHERE section_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawSection::from_row,
    )
    .optional()
}

// ─── EnrollmentStore impl ────────────────────────────────────────────────────

impl EnrollmentStore for SqliteStore {
  type Error = Error;

  // ── Prospects ─────────────────────────────────────────────────────────────

  async fn list_prospects(&self) -> Result<Vec<Prospect>> {
    let raws: Vec<RawProspect> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROSPECT_COLUMNS} FROM prospects
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawProspect::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProspect::into_prospect).collect()
  }

  async fn get_prospect(&self, id: Uuid) -> Result<Option<Prospect>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_prospect(conn, id)?))
      .await?;

    raw.map(RawProspect::into_prospect).transpose()
  }

  async fn create_prospect(&self, input: NewProspect) -> Result<Prospect> {
    let at = now();
    let status = input.initial_status();
    let d = input.details;
    let prospect = Prospect {
      id:                Uuid::new_v4(),
      student_name:      d.student_name,
      grade:             d.grade,
      parent_name:       d.parent_name,
      phone:             d.phone,
      email:             d.email,
      status:            Status::from(status),
      observation:       d.observation,
      created_at:        at,
      updated_at:        at,
      last_contact_date: None,
    };

    let id_str      = encode_uuid(prospect.id);
    let at_str      = encode_dt(at);
    let fields      = [
      prospect.student_name.clone(),
      prospect.grade.clone(),
      prospect.parent_name.clone(),
      prospect.phone.clone(),
      prospect.email.clone(),
    ];
    let observation = prospect.observation.clone();

    self
      .conn
      .call(move |conn| {
        let [student_name, grade, parent_name, phone, email] = fields;
        conn.execute(
          "INSERT INTO prospects (
             prospect_id, student_name, grade, parent_name, phone, email,
             status, observation, created_at, updated_at, last_contact_ms
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9, NULL)",
          rusqlite::params![
            id_str,
            student_name,
            grade,
            parent_name,
            phone,
            email,
            status.label(),
            observation,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(prospect = %prospect.id, "prospect created");
    Ok(prospect)
  }

  async fn update_prospect(&self, id: Uuid, edit: ProspectEdit) -> Result<Prospect> {
    let ProspectEdit { details, status, if_match } = edit;
    let entry_id = Uuid::new_v4();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = match lock_prospect(&tx, id, if_match.as_deref())? {
          Guarded::Done(current) => current,
          Guarded::Missing => return Ok(Guarded::Missing),
          Guarded::Stale => return Ok(Guarded::Stale),
        };
        let at = now();

        tx.execute(
          "UPDATE prospects
           SET student_name = ?1, grade = ?2, parent_name = ?3, phone = ?4,
               email = ?5, observation = ?6, updated_at = ?7
           WHERE prospect_id = ?8",
          rusqlite::params![
            details.student_name,
            details.grade,
            details.parent_name,
            details.phone,
            details.email,
            details.observation,
            encode_dt(at),
            encode_uuid(id),
          ],
        )?;

        let transitioned = match status {
          Some(next) if next.label() != current => {
            apply_transition(&tx, entry_id, id, &current, next, at)?;
            Some((current, next))
          }
          _ => None,
        };

        let raw = select_prospect(&tx, id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Guarded::Done((raw, transitioned)))
      })
      .await?;

    match outcome {
      Guarded::Missing => Err(CoreError::ProspectNotFound(id).into()),
      Guarded::Stale => Err(CoreError::PreconditionFailed(id).into()),
      Guarded::Done((raw, transitioned)) => {
        if let Some((from, to)) = transitioned {
          tracing::debug!(prospect = %id, %from, %to, "status changed by edit");
        }
        raw.into_prospect()
      }
    }
  }

  async fn delete_prospect(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM prospects WHERE prospect_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(CoreError::ProspectNotFound(id).into());
    }
    tracing::info!(prospect = %id, "prospect deleted");
    Ok(())
  }

  // ── Status transitions ────────────────────────────────────────────────────

  async fn change_status(&self, change: StatusChange) -> Result<AppliedTransition> {
    let StatusChange { prospect_id: id, new_status, if_match } = change;
    let entry_id = Uuid::new_v4();

    let outcome = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock before the status is read, so the
        // read-modify-write cannot interleave with another writer.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous = match lock_prospect(&tx, id, if_match.as_deref())? {
          Guarded::Done(previous) => previous,
          Guarded::Missing => return Ok(Guarded::Missing),
          Guarded::Stale => return Ok(Guarded::Stale),
        };
        // Stamped under the write lock so `changed_at` follows commit order.
        let at = now();

        apply_transition(&tx, entry_id, id, &previous, new_status, at)?;

        let raw = select_prospect(&tx, id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Guarded::Done((previous, raw, at)))
      })
      .await?;

    let (previous, raw, at) = match outcome {
      Guarded::Done(done) => done,
      Guarded::Missing => return Err(CoreError::ProspectNotFound(id).into()),
      Guarded::Stale => return Err(CoreError::PreconditionFailed(id).into()),
    };

    tracing::debug!(prospect = %id, from = %previous, to = %new_status, "status changed");

    Ok(AppliedTransition {
      prospect: raw.into_prospect()?,
      entry:    StatusHistoryEntry {
        id:              entry_id,
        prospect_id:     id,
        previous_status: Some(Status::from(previous)),
        new_status:      Status::from(new_status),
        changed_at:      at,
      },
    })
  }

  async fn list_history(&self, prospect_id: Uuid) -> Result<Vec<StatusHistoryEntry>> {
    let raws: Option<Vec<RawHistoryEntry>> = self
      .conn
      .call(move |conn| {
        let id_str = encode_uuid(prospect_id);
        let mut stmt = conn.prepare(&format!(
          "SELECT {HISTORY_COLUMNS} FROM status_history
           WHERE prospect_id = ?1
           ORDER BY changed_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawHistoryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        // History outlives a deleted prospect, so only an id with neither a
        // row nor any history is unknown.
        if rows.is_empty() && select_prospect(conn, prospect_id)?.is_none() {
          return Ok(None);
        }
        Ok(Some(rows))
      })
      .await?;

    raws
      .ok_or(CoreError::ProspectNotFound(prospect_id))?
      .into_iter()
      .map(RawHistoryEntry::into_entry)
      .collect()
  }

  // ── Class sections ────────────────────────────────────────────────────────

  async fn list_sections(&self) -> Result<Vec<ClassSection>> {
    let raws: Vec<RawSection> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SECTION_COLUMNS} FROM class_sections ORDER BY series, label"
        ))?;
        let rows = stmt
          .query_map([], RawSection::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSection::into_section).collect()
  }

  async fn get_section(&self, id: Uuid) -> Result<Option<ClassSection>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_section(conn, id)?))
      .await?;

    raw.map(RawSection::into_section).transpose()
  }

  async fn update_enrollment(&self, id: Uuid, enrolled_count: u32) -> Result<ClassSection> {
    let raw = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE class_sections SET enrolled_count = ?1 WHERE section_id = ?2",
          rusqlite::params![enrolled_count, encode_uuid(id)],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(select_section(conn, id)?)
      })
      .await?;

    let section = raw.ok_or(CoreError::SectionNotFound(id))?.into_section()?;
    tracing::debug!(
      section = %id,
      enrolled = section.enrolled_count,
      seats = section.total_seats,
      "enrollment updated"
    );
    Ok(section)
  }
}
