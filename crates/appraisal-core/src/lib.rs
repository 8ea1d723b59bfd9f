//! Core domain types for the performance appraisal portal.
//!
//! This crate contains:
//! - Resource identifiers and references to other records
//! - Cycle, template, assignment, appraisal record and dispute types
//! - The status presenter (status to badge mapping)
//! - Dispute eligibility and dashboard statistics
//! - Form state holders that turn UI input into backend payloads

pub mod assignment;
pub mod cycle;
pub mod dispute;
pub mod error;
pub mod form;
pub mod id;
pub mod organization;
pub mod record;
pub mod reference;
mod serde_util;
pub mod status;
pub mod template;

pub use error::{Error, Result};
pub use id::ResourceId;
pub use reference::{Label, Named, PersonSummary, Ref};
pub use status::Badge;
