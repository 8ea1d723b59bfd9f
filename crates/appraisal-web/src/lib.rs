//! Web front-end for the performance appraisal portal.
//!
//! Server-rendered pages: each request loads its data from the backend API,
//! renders an askama template, and form posts either re-render the form or
//! redirect.

pub mod error;
pub mod flash;
pub mod form_data;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

pub use state::AppState;
