//! Integration tests for `SqliteStore` against an in-memory database.

use educrm_core::{
  Classify as _,
  ErrorKind,
  etag::prospect_etag,
  prospect::{ContactDetails, NewProspect, ProspectEdit},
  section::RiskTier,
  stage::{Stage, Status},
  store::EnrollmentStore,
  transition::StatusChange,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn details(student: &str) -> ContactDetails {
  ContactDetails {
    student_name: student.into(),
    grade:        "3º Ano".into(),
    parent_name:  "Maria Souza".into(),
    phone:        "(11) 98888-7777".into(),
    email:        "maria@example.com".into(),
    observation:  None,
  }
}

async fn prospect(s: &SqliteStore, student: &str) -> educrm_core::prospect::Prospect {
  s.create_prospect(NewProspect::new(details(student)).unwrap())
    .await
    .unwrap()
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_is_seeded_with_sections() {
  let s = store().await;
  let sections = s.list_sections().await.unwrap();
  assert_eq!(sections.len(), 25);

  let first = &sections[0];
  assert_eq!((first.series.as_str(), first.label.as_str()), ("1º Ano", "101"));

  let keys: Vec<_> = sections
    .iter()
    .map(|c| (c.series.clone(), c.label.clone()))
    .collect();
  let mut sorted = keys.clone();
  sorted.sort();
  assert_eq!(keys, sorted);
}

#[tokio::test]
async fn seeded_over_capacity_section_is_preserved() {
  let s = store().await;
  let sections = s.list_sections().await.unwrap();
  let s611 = sections.iter().find(|c| c.label == "611").unwrap();
  assert_eq!((s611.enrolled_count, s611.total_seats), (19, 3));

  let cap = s611.capacity().unwrap();
  assert_eq!(cap.available, -16);
  assert_eq!(cap.occupancy_percent, 633);
  assert_eq!(cap.risk_tier, RiskTier::Critical);
}

#[tokio::test]
async fn seeding_does_not_duplicate_on_reopen() {
  let dir = std::env::temp_dir().join(format!("educrm-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("seed.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    assert_eq!(s.list_sections().await.unwrap().len(), 25);
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.list_sections().await.unwrap().len(), 25);

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}

// ─── Prospects ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_prospect_starts_as_lead_without_history() {
  let s = store().await;
  let p = prospect(&s, "Ana Lima").await;

  assert_eq!(p.status, Stage::Lead);
  assert!(p.last_contact_date.is_none());
  assert_eq!(p.created_at, p.updated_at);

  let fetched = s.get_prospect(p.id).await.unwrap().unwrap();
  assert_eq!(fetched, p);
  assert!(s.list_history(p.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_missing_prospect_returns_none() {
  let s = store().await;
  assert!(s.get_prospect(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn prospects_are_listed_newest_first_and_idempotently() {
  let s = store().await;
  let a = prospect(&s, "Ana").await;
  let b = prospect(&s, "Bruno").await;
  let c = prospect(&s, "Carla").await;

  let first = s.list_prospects().await.unwrap();
  let ids: Vec<_> = first.iter().map(|p| p.id).collect();
  assert_eq!(ids, vec![c.id, b.id, a.id]);

  let second = s.list_prospects().await.unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
async fn edit_without_status_keeps_status_and_history() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;

  let mut d = details("Ana Paula");
  d.observation = Some("prefers afternoons".into());
  let edited = s
    .update_prospect(p.id, ProspectEdit::new(d, None).unwrap())
    .await
    .unwrap();

  assert_eq!(edited.student_name, "Ana Paula");
  assert_eq!(edited.observation.as_deref(), Some("prefers afternoons"));
  assert_eq!(edited.status, Stage::Lead);
  assert!(s.list_history(p.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_that_changes_status_records_history() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;

  let edit = ProspectEdit::new(details("Ana"), Some(Stage::Replied)).unwrap();
  let edited = s.update_prospect(p.id, edit).await.unwrap();
  assert_eq!(edited.status, Stage::Replied);
  assert!(edited.last_contact_date.is_some());

  let history = s.list_history(p.id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].previous_status, Some(Status::from(Stage::Lead)));
  assert_eq!(history[0].new_status, Stage::Replied);

  // Re-submitting the same status is not a transition.
  let edit = ProspectEdit::new(details("Ana"), Some(Stage::Replied)).unwrap();
  s.update_prospect(p.id, edit).await.unwrap();
  assert_eq!(s.list_history(p.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn edit_missing_prospect_is_not_found() {
  let s = store().await;
  let err = s
    .update_prospect(Uuid::new_v4(), ProspectEdit::new(details("X"), None).unwrap())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(educrm_core::Error::ProspectNotFound(_))));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_removes_prospect_but_keeps_history() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;
  s.change_status(StatusChange::new(p.id, Stage::FirstContact))
    .await
    .unwrap();

  s.delete_prospect(p.id).await.unwrap();
  assert!(s.get_prospect(p.id).await.unwrap().is_none());

  let remaining = s.history_rows_for(p.id).await.unwrap();
  assert_eq!(remaining, 1);

  let history = s.list_history(p.id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].previous_status, Some(Status::from(Stage::Lead)));
  assert_eq!(history[0].new_status, Stage::FirstContact);

  let err = s.delete_prospect(p.id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn history_rows_cannot_be_rewritten() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;
  s.change_status(StatusChange::new(p.id, Stage::Replied))
    .await
    .unwrap();

  assert!(s.execute_raw("DELETE FROM status_history").await.is_err());
  assert!(
    s.execute_raw("UPDATE status_history SET new_status = 'Lead'")
      .await
      .is_err()
  );
  assert_eq!(s.list_history(p.id).await.unwrap().len(), 1);
}

// ─── Status transitions ──────────────────────────────────────────────────────

#[tokio::test]
async fn every_stage_pair_appends_exactly_one_entry() {
  let s = store().await;

  for from in Stage::all() {
    for to in Stage::all() {
      let p = prospect(&s, "Pair").await;
      if from != Stage::Lead {
        s.change_status(StatusChange::new(p.id, from)).await.unwrap();
      }
      let before = s.list_history(p.id).await.unwrap().len();

      let applied = s.change_status(StatusChange::new(p.id, to)).await.unwrap();
      assert_eq!(applied.prospect.status, to);
      assert_eq!(applied.entry.previous_status, Some(Status::from(from)));
      assert_eq!(applied.entry.new_status, to);

      let history = s.list_history(p.id).await.unwrap();
      assert_eq!(history.len(), before + 1, "{from} -> {to}");
      assert_eq!(history[0], applied.entry);
    }
  }
}

#[tokio::test]
async fn self_transition_is_recorded() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;

  let applied = s
    .change_status(StatusChange::new(p.id, Stage::Lead))
    .await
    .unwrap();
  assert!(applied.entry.is_self_transition());
  assert_eq!(s.list_history(p.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn transition_stamps_last_contact_and_updated_at() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;

  let applied = s
    .change_status(StatusChange::new(p.id, Stage::VisitScheduled))
    .await
    .unwrap();
  // Last contact is kept at millisecond precision.
  assert_eq!(
    applied.prospect.last_contact_date.map(|t| t.timestamp_millis()),
    Some(applied.entry.changed_at.timestamp_millis())
  );
  assert_eq!(applied.prospect.updated_at, applied.entry.changed_at);
  assert_eq!(s.get_prospect(p.id).await.unwrap().unwrap(), applied.prospect);
}

#[tokio::test]
async fn invalid_status_labels_are_rejected_before_the_store() {
  let id = Uuid::new_v4();
  for raw in ["", "   ", "Matriculado", "lead"] {
    let err = StatusChange::parse(id, raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{raw:?}");
  }
  assert_eq!(
    StatusChange::parse(id, "Em Negociação").unwrap().new_status,
    Stage::Negotiating
  );
}

#[tokio::test]
async fn transition_on_missing_prospect_is_not_found() {
  let s = store().await;
  let err = s
    .change_status(StatusChange::new(Uuid::new_v4(), Stage::Replied))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(educrm_core::Error::ProspectNotFound(_))));
}

#[tokio::test]
async fn stale_etag_fails_without_writing() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;
  let stale = prospect_etag(&p);

  let applied = s
    .change_status(
      StatusChange::new(p.id, Stage::FirstContact).with_if_match(Some(stale.clone())),
    )
    .await
    .unwrap();
  let fresh = prospect_etag(&applied.prospect);
  assert_ne!(fresh, stale);

  let err = s
    .change_status(StatusChange::new(p.id, Stage::Replied).with_if_match(Some(stale)))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::PreconditionFailed);

  let current = s.get_prospect(p.id).await.unwrap().unwrap();
  assert_eq!(current.status, Stage::FirstContact);
  assert_eq!(s.list_history(p.id).await.unwrap().len(), 1);

  let edit = ProspectEdit::new(details("Ana"), None)
    .unwrap()
    .with_if_match(Some(format!("W/{fresh}")));
  s.update_prospect(p.id, edit).await.unwrap();
}

#[tokio::test]
async fn concurrent_changes_are_both_recorded() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;

  let (a, b) = tokio::join!(
    s.change_status(StatusChange::new(p.id, Stage::Replied)),
    s.change_status(StatusChange::new(p.id, Stage::VisitScheduled)),
  );
  let (a, b) = (a.unwrap(), b.unwrap());

  let history = s.list_history(p.id).await.unwrap();
  assert_eq!(history.len(), 2);

  // Whichever ran second saw the first one's result as its previous status.
  let final_status = s.get_prospect(p.id).await.unwrap().unwrap().status;
  let (first, second) = if final_status == Stage::Replied { (b, a) } else { (a, b) };
  assert_eq!(first.entry.previous_status, Some(Status::from(Stage::Lead)));
  assert_eq!(second.entry.previous_status, Some(first.entry.new_status.clone()));

  // Timestamps follow the order the writes were applied in.
  assert!(second.entry.changed_at >= first.entry.changed_at);
  assert!(second.prospect.updated_at >= first.prospect.updated_at);
  assert_eq!(history[0].id, second.entry.id);
  assert_eq!(history[1].id, first.entry.id);
}

#[tokio::test]
async fn history_is_newest_first() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;

  for stage in [Stage::FirstContact, Stage::Replied, Stage::Negotiating] {
    s.change_status(StatusChange::new(p.id, stage)).await.unwrap();
  }

  let history = s.list_history(p.id).await.unwrap();
  let statuses: Vec<_> = history.iter().map(|e| e.new_status.clone()).collect();
  assert_eq!(
    statuses,
    vec![
      Status::from(Stage::Negotiating),
      Status::from(Stage::Replied),
      Status::from(Stage::FirstContact),
    ]
  );
  assert!(history.windows(2).all(|w| w[0].changed_at >= w[1].changed_at));
}

#[tokio::test]
async fn history_of_unknown_prospect_is_not_found() {
  let s = store().await;
  let err = s.list_history(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  // Deleted before any transition: nothing was ever recorded for it.
  let p = prospect(&s, "Ana").await;
  s.delete_prospect(p.id).await.unwrap();
  let err = s.list_history(p.id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn existing_prospect_without_transitions_has_empty_history() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;
  assert!(s.list_history(p.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_history_append_rolls_back_the_transition() {
  let s = store().await;
  let p = prospect(&s, "Ana").await;
  s.execute_raw(
    "CREATE TRIGGER block_history BEFORE INSERT ON status_history
     BEGIN SELECT RAISE(ABORT, 'history unavailable'); END",
  )
  .await
  .unwrap();

  let err = s
    .change_status(StatusChange::new(p.id, Stage::Replied))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

  let edit = ProspectEdit::new(details("Ana Renamed"), Some(Stage::Negotiating)).unwrap();
  let err = s.update_prospect(p.id, edit).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

  let current = s.get_prospect(p.id).await.unwrap().unwrap();
  assert_eq!(current.status, Stage::Lead);
  assert_eq!(current.student_name, "Ana");
  assert_eq!(current.updated_at, p.updated_at);
  assert_eq!(current.last_contact_date, None);
  assert_eq!(s.history_rows_for(p.id).await.unwrap(), 0);
}

// ─── Sections ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn enrollment_update_accepts_over_capacity_counts() {
  let s = store().await;
  let section = s.list_sections().await.unwrap().remove(0);

  let updated = s
    .update_enrollment(section.id, section.total_seats + 4)
    .await
    .unwrap();
  assert_eq!(updated.enrolled_count, section.total_seats + 4);
  assert!(updated.capacity().unwrap().is_over_capacity());
  assert_eq!(s.get_section(section.id).await.unwrap().unwrap(), updated);
}

#[tokio::test]
async fn enrollment_update_on_missing_section_is_not_found() {
  let s = store().await;
  let err = s.update_enrollment(Uuid::new_v4(), 3).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(educrm_core::Error::SectionNotFound(_))));
  assert!(s.get_section(Uuid::new_v4()).await.unwrap().is_none());
}
