//! JSON REST API for EduCRM.
//!
//! Exposes an axum [`Router`] backed by any
//! [`educrm_core::store::EnrollmentStore`]. TLS, CORS and static files are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", educrm_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod pipeline;
pub mod prospects;
pub mod sections;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch},
};
use educrm_core::store::EnrollmentStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: EnrollmentStore + 'static,
{
  Router::new()
    // Prospects
    .route(
      "/prospects",
      get(prospects::list::<S>).post(prospects::create::<S>),
    )
    .route(
      "/prospects/{id}",
      get(prospects::get_one::<S>)
        .put(prospects::update::<S>)
        .delete(prospects::delete::<S>),
    )
    .route("/prospects/{id}/status", patch(prospects::change_status::<S>))
    .route("/prospects/{id}/history", get(prospects::history::<S>))
    // Sections
    .route("/sections", get(sections::list::<S>))
    .route(
      "/sections/{id}",
      get(sections::get_one::<S>).put(sections::update_enrollment::<S>),
    )
    // Pipeline
    .route("/pipeline", get(pipeline::summary::<S>))
    .route("/pipeline/funnel", get(pipeline::funnel::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
