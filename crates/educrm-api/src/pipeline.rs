//! Handlers for `/pipeline` endpoints — dashboard counts and funnel columns.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  response::{IntoResponse, Response},
};
use educrm_core::{
  pipeline::{PipelineSummary, aggregate_by_status, group_by_status},
  store::EnrollmentStore,
};

use crate::error::ApiError;

/// `GET /pipeline`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<PipelineSummary>, ApiError>
where
  S: EnrollmentStore,
{
  let prospects = store.list_prospects().await.map_err(ApiError::store)?;
  Ok(Json(aggregate_by_status(&prospects)))
}

/// `GET /pipeline/funnel`
pub async fn funnel<S>(State(store): State<Arc<S>>) -> Result<Response, ApiError>
where
  S: EnrollmentStore,
{
  let prospects = store.list_prospects().await.map_err(ApiError::store)?;
  // Columns borrow from `prospects`, so serialise before returning.
  Ok(Json(group_by_status(&prospects)).into_response())
}
