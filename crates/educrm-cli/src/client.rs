//! Async HTTP client wrapping the EduCRM JSON API.

use anyhow::{Context, Result, anyhow};
use educrm_core::{
  history::StatusHistoryEntry,
  prospect::Prospect,
  section::{Capacity, ClassSection},
  stage::Stage,
};
use reqwest::{
  Client, StatusCode,
  header::{ETAG, IF_MATCH},
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the EduCRM API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// A section as served by `/api/sections`: the stored row plus capacity.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionRow {
  #[serde(flatten)]
  pub section:  ClassSection,
  pub capacity: Option<Capacity>,
}

/// Result of a conditional status change.
#[derive(Debug)]
pub enum StatusUpdate {
  Applied(Prospect),
  /// The prospect changed on the server since the ETag was taken.
  Stale,
}

/// Async HTTP client for the EduCRM JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  async fn get_json<T>(&self, path: &str) -> Result<T>
  where
    T: serde::de::DeserializeOwned,
  {
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET {path} → {}", resp.status()));
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising GET {path}"))
  }

  // ── Prospects ─────────────────────────────────────────────────────────────

  /// `GET /api/prospects`
  pub async fn list_prospects(&self) -> Result<Vec<Prospect>> {
    self.get_json("/prospects").await
  }

  /// `GET /api/prospects/<id>/history`
  pub async fn list_history(&self, id: Uuid) -> Result<Vec<StatusHistoryEntry>> {
    self.get_json(&format!("/prospects/{id}/history")).await
  }

  /// `PATCH /api/prospects/<id>/status`, conditional on `if_match` when given.
  pub async fn change_status(
    &self,
    id:       Uuid,
    stage:    Stage,
    if_match: Option<&str>,
  ) -> Result<StatusUpdate> {
    let mut req = self
      .client
      .patch(self.url(&format!("/prospects/{id}/status")))
      .json(&json!({ "status": stage.label() }));
    if let Some(etag) = if_match {
      req = req.header(IF_MATCH, etag);
    }

    let resp = req.send().await.context("PATCH /status failed")?;
    match resp.status() {
      StatusCode::PRECONDITION_FAILED => Ok(StatusUpdate::Stale),
      s if s.is_success() => {
        tracing::debug!(
          prospect = %id,
          etag = ?resp.headers().get(ETAG),
          "status changed"
        );
        let prospect = resp.json().await.context("deserialising prospect")?;
        Ok(StatusUpdate::Applied(prospect))
      }
      s => {
        let body = resp.text().await.unwrap_or_default();
        Err(anyhow!("PATCH /status → {s}: {body}"))
      }
    }
  }

  // ── Sections ──────────────────────────────────────────────────────────────

  /// `GET /api/sections`
  pub async fn list_sections(&self) -> Result<Vec<SectionRow>> {
    self.get_json("/sections").await
  }
}
