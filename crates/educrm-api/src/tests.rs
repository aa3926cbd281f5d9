//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use educrm_core::section::ClassSection;
use educrm_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{api_router, sections::SectionView};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(
  app:     &Router,
  method:  &str,
  uri:     &str,
  headers: Vec<(header::HeaderName, &str)>,
  body:    Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  for (k, v) in headers {
    builder = builder.header(k, v);
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn etag_of(resp: &Response) -> String {
  resp.headers()[header::ETAG].to_str().unwrap().to_owned()
}

fn intake(student: &str) -> Value {
  json!({
    "studentName": student,
    "grade": "1º Ano",
    "parentName": "Carlos Pereira",
    "phone": "(21) 97777-1234",
    "email": "carlos@example.com",
  })
}

async fn create(app: &Router, student: &str) -> Value {
  let resp = send(app, "POST", "/prospects", vec![], Some(intake(student))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  json_body(resp).await
}

// ── Prospects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_lead_in_camel_case() {
  let app = app().await;
  let p = create(&app, "Beatriz").await;

  assert_eq!(p["studentName"], "Beatriz");
  assert_eq!(p["status"], "Lead");
  assert!(p["lastContactDate"].is_null());
  assert!(p["observation"].is_null());
}

#[tokio::test]
async fn create_with_missing_fields_names_them() {
  let app = app().await;
  let resp = send(
    &app,
    "POST",
    "/prospects",
    vec![],
    Some(json!({ "studentName": "Beatriz", "phone": "  " })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let err = json_body(resp).await["error"].as_str().unwrap().to_owned();
  for field in ["grade", "parentName", "phone", "email"] {
    assert!(err.contains(field), "{err}");
  }
  assert!(!err.contains("studentName"));
}

#[tokio::test]
async fn list_is_newest_first() {
  let app = app().await;
  create(&app, "Primeiro").await;
  create(&app, "Segundo").await;

  let list = json_body(send(&app, "GET", "/prospects", vec![], None).await).await;
  let names: Vec<_> = list
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["studentName"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, vec!["Segundo", "Primeiro"]);
}

#[tokio::test]
async fn get_unknown_prospect_is_404() {
  let app = app().await;
  let resp = send(&app, "GET", &format!("/prospects/{}", Uuid::new_v4()), vec![], None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn deleted_prospect_is_gone() {
  let app = app().await;
  let p = create(&app, "Davi").await;
  let uri = format!("/prospects/{}", p["id"].as_str().unwrap());

  assert_eq!(send(&app, "DELETE", &uri, vec![], None).await.status(), StatusCode::NO_CONTENT);
  assert_eq!(send(&app, "GET", &uri, vec![], None).await.status(), StatusCode::NOT_FOUND);
  assert_eq!(send(&app, "DELETE", &uri, vec![], None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_survives_delete() {
  let app = app().await;
  let p = create(&app, "Fábio").await;
  let id = p["id"].as_str().unwrap();

  let resp = send(
    &app,
    "PATCH",
    &format!("/prospects/{id}/status"),
    vec![],
    Some(json!({ "status": "Respondeu" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let resp = send(&app, "DELETE", &format!("/prospects/{id}"), vec![], None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(&app, "GET", &format!("/prospects/{id}/history"), vec![], None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let history = json_body(resp).await;
  assert_eq!(history.as_array().unwrap().len(), 1);
  assert_eq!(history[0]["newStatus"], "Respondeu");
}

#[tokio::test]
async fn full_edit_with_status_is_historicised() {
  let app = app().await;
  let p = create(&app, "Elisa").await;
  let id = p["id"].as_str().unwrap();

  let mut body = intake("Elisa Martins");
  body["status"] = json!("Visita Agendada");
  let resp = send(&app, "PUT", &format!("/prospects/{id}"), vec![], Some(body)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let edited = json_body(resp).await;
  assert_eq!(edited["studentName"], "Elisa Martins");
  assert_eq!(edited["status"], "Visita Agendada");

  let history = json_body(
    send(&app, "GET", &format!("/prospects/{id}/history"), vec![], None).await,
  )
  .await;
  assert_eq!(history.as_array().unwrap().len(), 1);
  assert_eq!(history[0]["previousStatus"], "Lead");
}

// ── Status ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patch_status_updates_and_records_history() {
  let app = app().await;
  let p = create(&app, "Fábio").await;
  let id = p["id"].as_str().unwrap();

  let resp = send(
    &app,
    "PATCH",
    &format!("/prospects/{id}/status"),
    vec![],
    Some(json!({ "status": "1º Contato" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().contains_key(header::ETAG));
  let updated = json_body(resp).await;
  assert_eq!(updated["status"], "1º Contato");
  assert!(updated["lastContactDate"].is_i64());

  let history = json_body(
    send(&app, "GET", &format!("/prospects/{id}/history"), vec![], None).await,
  )
  .await;
  let entries = history.as_array().unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0]["previousStatus"], "Lead");
  assert_eq!(entries[0]["newStatus"], "1º Contato");
  assert_eq!(entries[0]["prospectId"], id);
}

#[tokio::test]
async fn patch_with_invalid_status_is_400_and_writes_nothing() {
  let app = app().await;
  let p = create(&app, "Gabi").await;
  let id = p["id"].as_str().unwrap();

  for status in [json!(""), json!("Matriculado")] {
    let resp = send(
      &app,
      "PATCH",
      &format!("/prospects/{id}/status"),
      vec![],
      Some(json!({ "status": status })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  let resp = send(
    &app,
    "PATCH",
    &format!("/prospects/{id}/status"),
    vec![],
    Some(json!({})),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let history = json_body(
    send(&app, "GET", &format!("/prospects/{id}/history"), vec![], None).await,
  )
  .await;
  assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn patch_unknown_prospect_is_404() {
  let app = app().await;
  let resp = send(
    &app,
    "PATCH",
    &format!("/prospects/{}/status", Uuid::new_v4()),
    vec![],
    Some(json!({ "status": "Respondeu" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stale_if_match_is_412() {
  let app = app().await;
  let p = create(&app, "Heitor").await;
  let id = p["id"].as_str().unwrap();
  let uri = format!("/prospects/{id}");

  let etag = etag_of(&send(&app, "GET", &uri, vec![], None).await);

  let resp = send(
    &app,
    "PATCH",
    &format!("{uri}/status"),
    vec![(header::IF_MATCH, etag.as_str())],
    Some(json!({ "status": "Respondeu" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let fresh = etag_of(&resp);
  assert_ne!(fresh, etag);

  let resp = send(
    &app,
    "PATCH",
    &format!("{uri}/status"),
    vec![(header::IF_MATCH, etag.as_str())],
    Some(json!({ "status": "Em Negociação" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

  let current = json_body(send(&app, "GET", &uri, vec![], None).await).await;
  assert_eq!(current["status"], "Respondeu");

  let resp = send(
    &app,
    "PUT",
    &uri,
    vec![(header::IF_MATCH, etag.as_str())],
    Some(intake("Heitor")),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

  let resp = send(&app, "PUT", &uri, vec![(header::IF_MATCH, "*")], Some(intake("Heitor"))).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn history_of_unknown_prospect_is_404() {
  let app = app().await;
  let resp = send(
    &app,
    "GET",
    &format!("/prospects/{}/history", Uuid::new_v4()),
    vec![],
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sections_carry_capacity() {
  let app = app().await;
  let sections = json_body(send(&app, "GET", "/sections", vec![], None).await).await;
  let sections = sections.as_array().unwrap();
  assert_eq!(sections.len(), 25);

  let s611 = sections.iter().find(|s| s["label"] == "611").unwrap();
  assert_eq!(s611["enrolledCount"], 19);
  assert_eq!(s611["totalSeats"], 3);
  assert_eq!(s611["capacity"]["available"], -16);
  assert_eq!(s611["capacity"]["occupancyPercent"], 633);
  assert_eq!(s611["capacity"]["riskTier"], "critical");

  let ber = sections.iter().find(|s| s["label"] == "BER").unwrap();
  assert_eq!(ber["capacity"]["available"], 5);
  assert_eq!(ber["capacity"]["riskTier"], "normal");
  assert!(ber["period"].is_null());
}

#[tokio::test]
async fn enrollment_update_recomputes_capacity() {
  let app = app().await;
  let sections = json_body(send(&app, "GET", "/sections", vec![], None).await).await;
  let m2b = sections
    .as_array()
    .unwrap()
    .iter()
    .find(|s| s["label"] == "M2B")
    .unwrap()
    .clone();
  let uri = format!("/sections/{}", m2b["id"].as_str().unwrap());

  let resp = send(&app, "PUT", &uri, vec![], Some(json!({ "enrolledCount": 13 }))).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let updated = json_body(resp).await;
  assert_eq!(updated["capacity"]["available"], 0);
  assert_eq!(updated["capacity"]["occupancyPercent"], 100);

  let resp = send(&app, "PUT", &uri, vec![], Some(json!({ "enrolledCount": -1 }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let fetched = json_body(send(&app, "GET", &uri, vec![], None).await).await;
  assert_eq!(fetched["enrolledCount"], 13);
}

#[tokio::test]
async fn unknown_section_is_404() {
  let app = app().await;
  let uri = format!("/sections/{}", Uuid::new_v4());
  assert_eq!(send(&app, "GET", &uri, vec![], None).await.status(), StatusCode::NOT_FOUND);
  let resp = send(&app, "PUT", &uri, vec![], Some(json!({ "enrolledCount": 1 }))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[test]
fn zero_seat_section_has_no_capacity() {
  let view = SectionView::from(ClassSection {
    id:             Uuid::new_v4(),
    series:         "Berçário".into(),
    label:          "BER2".into(),
    enrolled_count: 2,
    total_seats:    0,
    period:         None,
  });
  assert!(view.capacity.is_none());
  assert!(serde_json::to_value(&view).unwrap()["capacity"].is_null());
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pipeline_counts_every_stage() {
  let app = app().await;
  let a = create(&app, "Igor").await;
  create(&app, "Júlia").await;
  send(
    &app,
    "PATCH",
    &format!("/prospects/{}/status", a["id"].as_str().unwrap()),
    vec![],
    Some(json!({ "status": "Respondeu" })),
  )
  .await;

  let summary = json_body(send(&app, "GET", "/pipeline", vec![], None).await).await;
  assert_eq!(summary["total"], 2);
  assert_eq!(
    summary["byStage"],
    json!({
      "Lead": 1,
      "1º Contato": 0,
      "Respondeu": 1,
      "Visita Agendada": 0,
      "Em Negociação": 0,
    })
  );
}

#[tokio::test]
async fn funnel_has_five_ordered_columns() {
  let app = app().await;
  create(&app, "Karina").await;

  let funnel = json_body(send(&app, "GET", "/pipeline/funnel", vec![], None).await).await;
  let columns = funnel.as_array().unwrap();
  let stages: Vec<_> = columns.iter().map(|c| c["stage"].as_str().unwrap()).collect();
  assert_eq!(
    stages,
    vec!["Lead", "1º Contato", "Respondeu", "Visita Agendada", "Em Negociação"]
  );
  assert_eq!(columns[0]["count"], 1);
  assert_eq!(columns[0]["prospects"][0]["studentName"], "Karina");
  assert_eq!(columns[4]["count"], 0);
}
