//! Client-side cache of prospects and sections.
//!
//! Nothing refreshes on its own: callers `invalidate()` after a mutation and
//! `refresh()` when they want fresh data.

use anyhow::Result;
use chrono::{DateTime, Local};
use educrm_core::{
  etag::prospect_etag,
  pipeline::{PipelineSummary, StageColumn, aggregate_by_status, group_by_status},
  prospect::Prospect,
};
use uuid::Uuid;

use crate::client::{ApiClient, SectionRow};

#[derive(Debug, Default)]
pub struct Cache {
  prospects: Vec<Prospect>,
  sections:  Vec<SectionRow>,
  loaded_at: Option<DateTime<Local>>,
  stale:     bool,
}

impl Cache {
  /// Re-fetch both prospects and sections. On error the previous contents are
  /// kept and the cache stays stale.
  pub async fn refresh(&mut self, client: &ApiClient) -> Result<()> {
    let (prospects, sections) =
      tokio::try_join!(client.list_prospects(), client.list_sections())?;
    self.replace(prospects, sections);
    tracing::debug!(
      prospects = self.prospects.len(),
      sections = self.sections.len(),
      "cache refreshed"
    );
    Ok(())
  }

  fn replace(&mut self, prospects: Vec<Prospect>, sections: Vec<SectionRow>) {
    self.prospects = prospects;
    self.sections = sections;
    self.loaded_at = Some(Local::now());
    self.stale = false;
  }

  /// Mark the cached data as outdated.
  pub fn invalidate(&mut self) { self.stale = true; }

  pub fn is_stale(&self) -> bool { self.stale || self.loaded_at.is_none() }

  pub fn loaded_at(&self) -> Option<DateTime<Local>> { self.loaded_at }

  /// Prospects, newest first.
  pub fn prospects(&self) -> &[Prospect] { &self.prospects }

  pub fn sections(&self) -> &[SectionRow] { &self.sections }

  pub fn prospect(&self, id: Uuid) -> Option<&Prospect> {
    self.prospects.iter().find(|p| p.id == id)
  }

  /// ETag of the cached copy of a prospect, for conditional writes.
  pub fn etag(&self, id: Uuid) -> Option<String> {
    self.prospect(id).map(prospect_etag)
  }

  pub fn summary(&self) -> PipelineSummary { aggregate_by_status(&self.prospects) }

  pub fn columns(&self) -> Vec<StageColumn<'_>> { group_by_status(&self.prospects) }

  #[cfg(test)]
  pub(crate) fn set_sections(&mut self, sections: Vec<SectionRow>) {
    let prospects = std::mem::take(&mut self.prospects);
    self.replace(prospects, sections);
  }
}
