//! Core types and trait definitions for the EduCRM enrollment pipeline.
//!
//! Pipeline stages, capacity arithmetic and funnel aggregation are pure
//! functions here. Persistence sits behind [`store::EnrollmentStore`].

// Store futures are spelled out as `impl Future + Send`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod etag;
pub mod history;
pub mod pipeline;
pub mod prospect;
pub mod section;
pub mod stage;
pub mod store;
pub mod transition;

pub use error::{Classify, Error, ErrorKind, Result};
