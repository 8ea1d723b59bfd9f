//! KDL configuration parsing for the appraisal portal.
//!
//! This crate handles:
//! - The portal config file (`appraisal.kdl`): listen address, backend API, session
//! - Environment overrides applied on top of the file

pub mod error;
pub mod portal;

pub use error::{ConfigError, ConfigResult};
pub use portal::{
    ApiConfig, PortalConfig, ServerConfig, SessionConfig, apply_env_overrides, load,
    parse_portal_config,
};
