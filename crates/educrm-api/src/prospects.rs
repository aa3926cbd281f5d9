//! Handlers for `/prospects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/prospects` | Newest first |
//! | `POST`   | `/prospects` | Body: [`ProspectBody`]; returns 201 + prospect |
//! | `GET`    | `/prospects/:id` | `ETag` header; 404 if not found |
//! | `PUT`    | `/prospects/:id` | Body: [`EditBody`]; honours `If-Match` |
//! | `DELETE` | `/prospects/:id` | 204; history is kept |
//! | `PATCH`  | `/prospects/:id/status` | Body: `{"status":"Respondeu"}`; honours `If-Match` |
//! | `GET`    | `/prospects/:id/history` | Newest first; kept after delete; 404 if never seen |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::{
    HeaderMap, StatusCode,
    header::{ETAG, IF_MATCH},
  },
  response::IntoResponse,
};
use educrm_core::{
  etag::prospect_etag,
  history::StatusHistoryEntry,
  prospect::{ContactDetails, NewProspect, Prospect, ProspectEdit},
  stage::Stage,
  store::EnrollmentStore,
  transition::StatusChange,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Bodies ───────────────────────────────────────────────────────────────────

/// Intake fields. Missing fields deserialize as empty so validation can
/// report all of them at once.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProspectBody {
  pub student_name: String,
  pub grade:        String,
  pub parent_name:  String,
  pub phone:        String,
  pub email:        String,
  pub observation:  Option<String>,
}

impl From<ProspectBody> for ContactDetails {
  fn from(b: ProspectBody) -> Self {
    ContactDetails {
      student_name: b.student_name,
      grade:        b.grade,
      parent_name:  b.parent_name,
      phone:        b.phone,
      email:        b.email,
      observation:  b.observation,
    }
  }
}

/// Full edit: the intake fields plus an optional status label.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditBody {
  #[serde(flatten)]
  pub details: ProspectBody,
  pub status:  Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  #[serde(default)]
  pub status: String,
}

/// The `If-Match` value, if any. `*` matches any existing prospect.
fn if_match(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
  let Some(value) = headers.get(IF_MATCH) else {
    return Ok(None);
  };
  let value = value
    .to_str()
    .map_err(|_| ApiError::BadRequest("If-Match is not valid ASCII".into()))?
    .trim();
  Ok((value != "*").then(|| value.to_owned()))
}

fn with_etag(prospect: Prospect) -> impl IntoResponse {
  ([(ETAG, prospect_etag(&prospect))], Json(prospect))
}

// ─── List / create ────────────────────────────────────────────────────────────

/// `GET /prospects`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Prospect>>, ApiError>
where
  S: EnrollmentStore,
{
  let prospects = store.list_prospects().await.map_err(ApiError::store)?;
  Ok(Json(prospects))
}

/// `POST /prospects`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ProspectBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EnrollmentStore,
{
  let input = NewProspect::new(body.into())?;
  let prospect = store.create_prospect(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, with_etag(prospect)))
}

// ─── Single prospect ──────────────────────────────────────────────────────────

/// `GET /prospects/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EnrollmentStore,
{
  let prospect = store
    .get_prospect(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("prospect {id} not found")))?;
  Ok(with_etag(prospect))
}

/// `PUT /prospects/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<EditBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EnrollmentStore,
{
  let status = body
    .status
    .as_deref()
    .map(Stage::parse_requested)
    .transpose()?;
  let edit = ProspectEdit::new(body.details.into(), status)?
    .with_if_match(if_match(&headers)?);

  let prospect = store
    .update_prospect(id, edit)
    .await
    .map_err(ApiError::store)?;
  Ok(with_etag(prospect))
}

/// `DELETE /prospects/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: EnrollmentStore,
{
  store.delete_prospect(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Status ───────────────────────────────────────────────────────────────────

/// `PATCH /prospects/:id/status` — body: `{"status":"<label>"}`
pub async fn change_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<StatusBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EnrollmentStore,
{
  let change =
    StatusChange::parse(id, &body.status)?.with_if_match(if_match(&headers)?);
  let applied = store.change_status(change).await.map_err(ApiError::store)?;
  Ok(with_etag(applied.prospect))
}

/// `GET /prospects/:id/history`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<StatusHistoryEntry>>, ApiError>
where
  S: EnrollmentStore,
{
  let entries = store.list_history(id).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}
