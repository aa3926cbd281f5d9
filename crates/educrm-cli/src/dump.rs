//! Plain-text report for `educrm --dump`.

use std::fmt::Write as _;

use educrm_core::prospect::Prospect;

use crate::client::SectionRow;

/// Every prospect, newest first, followed by the section count.
pub fn render(prospects: &[Prospect], sections: &[SectionRow]) -> String {
  let mut out = String::new();

  let _ = writeln!(out, "PROSPECTS ({} registered)\n", prospects.len());
  if prospects.is_empty() {
    let _ = writeln!(out, "   No prospects registered yet.\n");
  }
  for (i, p) in prospects.iter().enumerate() {
    let _ = writeln!(out, "   {}. {} ({})", i + 1, p.student_name, p.grade);
    let _ = writeln!(out, "      Parent:  {}", p.parent_name);
    let _ = writeln!(out, "      Phone:   {}", p.phone);
    let _ = writeln!(out, "      Email:   {}", p.email);
    let _ = writeln!(out, "      Status:  {}", p.status);
    let _ = writeln!(out, "      Created: {}", p.created_at.to_rfc3339());
    let _ = writeln!(out);
  }

  let _ = writeln!(out, "SECTIONS ({} registered)", sections.len());
  out
}
