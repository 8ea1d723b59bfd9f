//! Client for the performance management backend.
//!
//! Provides the [`PerformanceApi`] trait, its reqwest implementation, a
//! recording mock for tests, and the page data loaders built on top.

pub mod api;
pub mod error;
pub mod fetch;
pub mod http;
pub mod mock;

pub use api::PerformanceApi;
pub use error::{ClientError, ClientResult};
pub use fetch::{Loaded, UserContext};
pub use http::HttpPerformanceApi;
