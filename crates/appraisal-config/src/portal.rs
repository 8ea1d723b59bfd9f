//! Portal configuration parsing.
//!
//! ```kdl
//! server listen="0.0.0.0:3000"
//! api base-url="http://localhost:5000" {
//!     token "..."
//! }
//! session {
//!     default-user "665f0c..."
//!     user-header "x-user-id"
//!     user-cookie "perf_user_id"
//! }
//! ```

use std::net::SocketAddr;
use std::path::Path;

use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ConfigError, ConfigResult};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_USER_HEADER: &str = "x-user-id";
pub const DEFAULT_USER_COOKIE: &str = "perf_user_id";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

/// The backend REST API the portal talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Validated http(s) URL without a trailing slash.
    pub base_url: String,
    /// Sent as a bearer token when set.
    pub token: Option<String>,
}

/// Where the current user id comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub default_user: Option<String>,
    pub user_header: String,
    pub user_cookie: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_user: None,
            user_header: DEFAULT_USER_HEADER.to_string(),
            user_cookie: DEFAULT_USER_COOKIE.to_string(),
        }
    }
}

/// Parse a portal configuration from KDL text.
pub fn parse_portal_config(kdl: &str) -> ConfigResult<PortalConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut config = PortalConfig::default();
    let mut seen = Vec::new();

    for node in doc.nodes() {
        let name = node.name().value();
        if matches!(name, "server" | "api" | "session") {
            if seen.contains(&name) {
                return Err(ConfigError::Duplicate(format!("{name} block")));
            }
            seen.push(name);
        }

        match name {
            "server" => config.server = parse_server(node)?,
            "api" => config.api = parse_api(node)?,
            "session" => config.session = parse_session(node),
            other => return Err(ConfigError::UnknownNode(other.to_string())),
        }
    }

    Ok(config)
}

fn parse_server(node: &KdlNode) -> ConfigResult<ServerConfig> {
    let listen = get_string_prop(node, "listen")
        .or_else(|| get_child_string(node, "listen"))
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

    Ok(ServerConfig {
        listen: parse_listen(&listen)?,
    })
}

fn parse_api(node: &KdlNode) -> ConfigResult<ApiConfig> {
    let base_url = get_string_prop(node, "base-url")
        .or_else(|| get_child_string(node, "base-url"))
        .ok_or_else(|| ConfigError::MissingField("api base-url".to_string()))?;

    let token = get_string_prop(node, "token")
        .or_else(|| get_child_string(node, "token"))
        .filter(|t| !t.is_empty());

    Ok(ApiConfig {
        base_url: parse_base_url(&base_url)?,
        token,
    })
}

fn parse_session(node: &KdlNode) -> SessionConfig {
    let defaults = SessionConfig::default();

    SessionConfig {
        default_user: get_child_string(node, "default-user").filter(|u| !u.is_empty()),
        user_header: get_child_string(node, "user-header")
            .map(|h| h.to_ascii_lowercase())
            .unwrap_or(defaults.user_header),
        user_cookie: get_child_string(node, "user-cookie").unwrap_or(defaults.user_cookie),
    }
}

fn parse_listen(value: &str) -> ConfigResult<SocketAddr> {
    value.parse().map_err(|e| ConfigError::InvalidValue {
        field: "server listen".to_string(),
        message: format!("{value}: {e}"),
    })
}

fn parse_base_url(value: &str) -> ConfigResult<String> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field: "api base-url".to_string(),
        message: format!("{value}: {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: "api base-url".to_string(),
            message: format!("unsupported scheme: {}", url.scheme()),
        });
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Load the config file at `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> ConfigResult<PortalConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_portal_config(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(PortalConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Apply `APPRAISAL_API_URL`, `APPRAISAL_LISTEN` and `APPRAISAL_API_TOKEN` on top of a parsed config.
///
/// `lookup` is normally `std::env::var(..).ok()`.
pub fn apply_env_overrides(
    mut config: PortalConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<PortalConfig> {
    if let Some(url) = lookup("APPRAISAL_API_URL").filter(|v| !v.is_empty()) {
        config.api.base_url = parse_base_url(&url)?;
    }
    if let Some(listen) = lookup("APPRAISAL_LISTEN").filter(|v| !v.is_empty()) {
        config.server.listen = parse_listen(&listen)?;
    }
    if let Some(token) = lookup("APPRAISAL_API_TOKEN").filter(|v| !v.is_empty()) {
        config.api.token = Some(token);
    }
    Ok(config)
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_child_string(node: &KdlNode, name: &str) -> Option<String> {
    node.children()?
        .nodes()
        .iter()
        .find(|child| child.name().value() == name)
        .and_then(get_first_string_arg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let kdl = r#"
            server listen="127.0.0.1:8080"

            api base-url="https://hr.example.com/api" {
                token "secret"
            }

            session {
                default-user "665f0c2a"
                user-header "X-Employee-Id"
                user-cookie "uid"
            }
        "#;

        let config = parse_portal_config(kdl).unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.api.base_url, "https://hr.example.com/api");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.session.default_user.as_deref(), Some("665f0c2a"));
        assert_eq!(config.session.user_header, "x-employee-id");
        assert_eq!(config.session.user_cookie, "uid");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_portal_config("").unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.session.user_header, DEFAULT_USER_HEADER);
    }

    #[test]
    fn test_api_requires_base_url() {
        let err = parse_portal_config(r#"api { token "x" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "api base-url"));
    }

    #[test]
    fn test_invalid_values() {
        let err = parse_portal_config(r#"server listen="not-an-addr""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = parse_portal_config(r#"api base-url="ftp://files""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_duplicate_block() {
        let kdl = r#"
            server listen="127.0.0.1:1"
            server listen="127.0.0.1:2"
        "#;
        assert!(matches!(
            parse_portal_config(kdl),
            Err(ConfigError::Duplicate(_))
        ));
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let err = parse_portal_config(r#"sesion { user-header "x-user" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNode(n) if n == "sesion"));
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env_overrides(PortalConfig::default(), |key| match key {
            "APPRAISAL_API_URL" => Some("http://backend:9000".to_string()),
            "APPRAISAL_LISTEN" => Some("127.0.0.1:4000".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api.base_url, "http://backend:9000");
        assert_eq!(config.server.listen.port(), 4000);
        assert_eq!(config.api.token, None);
    }

    #[test]
    fn test_load_missing_file() {
        let config = load(Path::new("/definitely/not/here/appraisal.kdl")).unwrap();
        assert_eq!(config, PortalConfig::default());
    }
}
