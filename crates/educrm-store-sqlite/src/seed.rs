//! Initial class-section roster, inserted once into an empty store.

use educrm_core::section::Period;
use uuid::Uuid;

use crate::encode::encode_uuid;

/// `(series, label, enrolled, total_seats, period)`
type SeedRow = (&'static str, &'static str, u32, u32, Option<Period>);

const MORNING: Option<Period> = Some(Period::Morning);
const AFTERNOON: Option<Period> = Some(Period::Afternoon);

/// The school's 25 sections. Several are over capacity (e.g. 611 holds 19
/// students in 3 seats); that is intentional data, not a mistake.
pub const SECTIONS: [SeedRow; 25] = [
  ("Berçário", "BER", 0, 5, None),
  ("MAT1", "M1A", 2, 13, MORNING),
  ("MAT1", "M1B", 4, 13, AFTERNOON),
  ("MAT2", "M2A", 6, 13, MORNING),
  ("MAT2", "M2B", 12, 13, AFTERNOON),
  ("PRE1", "PRE1A", 2, 24, MORNING),
  ("PRE1", "PRE1B", 8, 24, AFTERNOON),
  ("PRE2", "PRE2A", 8, 18, MORNING),
  ("PRE2", "PRE2B", 5, 18, AFTERNOON),
  ("1º Ano", "102", 5, 19, None),
  ("1º Ano", "101", 10, 19, None),
  ("2º Ano", "201", 20, 17, MORNING),
  ("2º Ano", "202", 15, 17, AFTERNOON),
  ("3º Ano", "302", 6, 23, None),
  ("3º Ano", "301", 9, 23, None),
  ("4º Ano", "401", 11, 23, MORNING),
  ("4º Ano", "402", 7, 23, AFTERNOON),
  ("5º Ano", "502", 6, 18, None),
  ("5º Ano", "501", 26, 18, None),
  ("6º Ano", "621", 1, 21, None),
  ("6º Ano", "611", 19, 3, None),
  ("7º Ano", "711", 7, 15, MORNING),
  ("7º Ano", "721", 10, 12, AFTERNOON),
  ("8º Ano", "811", 2, 20, None),
  ("9º Ano", "911", 4, 18, None),
];

/// Insert [`SECTIONS`] if `class_sections` is empty. Returns the number of
/// rows inserted (0 when the table already had data).
///
/// The emptiness check and the inserts share one transaction, so concurrent
/// openers cannot seed twice.
pub fn seed_sections_if_empty(
  conn: &mut rusqlite::Connection,
) -> rusqlite::Result<usize> {
  let tx = conn
    .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

  let existing: i64 =
    tx.query_row("SELECT COUNT(*) FROM class_sections", [], |r| r.get(0))?;
  if existing > 0 {
    return Ok(0);
  }

  {
    let mut stmt = tx.prepare(
      "INSERT INTO class_sections
         (section_id, series, label, enrolled_count, total_seats, period)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (series, label, enrolled, seats, period) in SECTIONS {
      stmt.execute(rusqlite::params![
        encode_uuid(Uuid::new_v4()),
        series,
        label,
        enrolled,
        seats,
        period.map(Period::label),
      ])?;
    }
  }

  tx.commit()?;
  Ok(SECTIONS.len())
}
