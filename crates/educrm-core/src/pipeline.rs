//! Pipeline aggregation — dashboard counts and funnel columns.
//!
//! Buckets are the five fixed stages, never discovered from data. A prospect
//! whose status is not one of them lands in no bucket.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{prospect::Prospect, stage::Stage};

/// Per-stage counts for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
  /// Every prospect supplied, whatever its status.
  pub total:    usize,
  /// All five stages, in pipeline order, including zero counts.
  pub by_stage: BTreeMap<Stage, usize>,
}

impl PipelineSummary {
  /// Prospects that fell into one of the five buckets.
  pub fn bucketed(&self) -> usize { self.by_stage.values().sum() }
}

/// One funnel column: a stage and the prospects currently in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageColumn<'a> {
  pub stage:     Stage,
  pub count:     usize,
  pub prospects: Vec<&'a Prospect>,
}

/// Count prospects per stage.
pub fn aggregate_by_status<'a, I>(prospects: I) -> PipelineSummary
where
  I: IntoIterator<Item = &'a Prospect>,
{
  let mut by_stage: BTreeMap<Stage, usize> =
    Stage::all().map(|stage| (stage, 0)).collect();
  let mut total = 0;

  for prospect in prospects {
    total += 1;
    if let Some(stage) = prospect.status.stage() {
      *by_stage.entry(stage).or_default() += 1;
    }
  }

  PipelineSummary { total, by_stage }
}

/// Group prospects into one column per stage, in pipeline order.
///
/// Each column keeps the order the prospects were supplied in; callers that
/// want newest-first columns pass a newest-first slice.
pub fn group_by_status<'a, I>(prospects: I) -> Vec<StageColumn<'a>>
where
  I: IntoIterator<Item = &'a Prospect>,
{
  let mut columns: Vec<StageColumn<'a>> = Stage::all()
    .map(|stage| StageColumn { stage, count: 0, prospects: Vec::new() })
    .collect();

  for prospect in prospects {
    let Some(stage) = prospect.status.stage() else { continue };
    if let Some(column) = columns.iter_mut().find(|c| c.stage == stage) {
      column.prospects.push(prospect);
      column.count += 1;
    }
  }

  columns
}
