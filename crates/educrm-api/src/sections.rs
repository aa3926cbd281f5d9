//! Handlers for `/sections` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sections` | Ordered by series, then label |
//! | `GET`  | `/sections/:id` | 404 if not found |
//! | `PUT`  | `/sections/:id` | Body: `{"enrolledCount":12}` |
//!
//! Every response carries the derived capacity alongside the stored row.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use educrm_core::{
  section::{Capacity, ClassSection},
  store::EnrollmentStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// A section plus its capacity figures. `capacity` is `null` for a section
/// with zero seats, where occupancy is undefined.
#[derive(Debug, Serialize)]
pub struct SectionView {
  #[serde(flatten)]
  pub section:  ClassSection,
  pub capacity: Option<Capacity>,
}

impl From<ClassSection> for SectionView {
  fn from(section: ClassSection) -> Self {
    let capacity = match section.capacity() {
      Ok(capacity) => Some(capacity),
      Err(e) => {
        tracing::warn!(section = %section.id, label = %section.label, "{e}");
        None
      }
    };
    Self { section, capacity }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentBody {
  pub enrolled_count: i64,
}

/// `GET /sections`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<SectionView>>, ApiError>
where
  S: EnrollmentStore,
{
  let sections = store.list_sections().await.map_err(ApiError::store)?;
  Ok(Json(sections.into_iter().map(SectionView::from).collect()))
}

/// `GET /sections/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SectionView>, ApiError>
where
  S: EnrollmentStore,
{
  let section = store
    .get_section(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("class section {id} not found")))?;
  Ok(Json(section.into()))
}

/// `PUT /sections/:id` — counts above the seat total are accepted.
pub async fn update_enrollment<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EnrollmentBody>,
) -> Result<Json<SectionView>, ApiError>
where
  S: EnrollmentStore,
{
  let count = u32::try_from(body.enrolled_count).map_err(|_| {
    ApiError::BadRequest(format!(
      "enrolledCount must be a non-negative integer, got {}",
      body.enrolled_count
    ))
  })?;
  let section = store
    .update_enrollment(id, count)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(section.into()))
}
