//! CLI command implementations.

pub mod assignments;
pub mod cycles;
pub mod dashboard;
pub mod disputes;
pub mod records;
pub mod templates;

mod table;

use anyhow::{Context, Result};
use appraisal_client::Loaded;
use chrono::{DateTime, Utc};

pub use table::Table;

/// Fail the command when a loader reported an error.
fn loaded<T>(loaded: Loaded<T>) -> Result<T> {
    match loaded.error {
        Some(message) => anyhow::bail!(message),
        None => Ok(loaded.data),
    }
}

fn date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn score(value: Option<f64>) -> String {
    value
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn validate(path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {path}"))?;
    let config = appraisal_config::parse_portal_config(&content)
        .with_context(|| format!("Configuration error in {path}"))?;

    println!("Configuration is valid");
    println!("  listen:       {}", config.server.listen);
    println!("  api:          {}", config.api.base_url);
    println!(
        "  token:        {}",
        if config.api.token.is_some() { "set" } else { "not set" }
    );
    println!("  user header:  {}", config.session.user_header);
    println!("  user cookie:  {}", config.session.user_cookie);
    if let Some(user) = &config.session.default_user {
        println!("  default user: {user}");
    }
    Ok(())
}
