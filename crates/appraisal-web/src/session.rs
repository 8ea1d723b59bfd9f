//! Current-user resolution.
//!
//! Authentication happens outside the portal. The user id is read from the
//! configured request header, then the user cookie, then the configured
//! default.

use std::convert::Infallible;

use appraisal_client::UserContext;
use appraisal_core::ResourceId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::AppState;

/// The user the current request acts for.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserContext);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(state.session.user_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let from_cookie = || {
            CookieJar::from_headers(&parts.headers)
                .get(&state.session.user_cookie)
                .map(|c| c.value().trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let user_id = from_header
            .or_else(from_cookie)
            .or_else(|| state.session.default_user.clone());

        Ok(CurrentUser(UserContext::new(user_id.map(ResourceId::from))))
    }
}

/// Cookie remembering the user picked on the home page.
pub fn user_cookie(name: &str, user_id: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), user_id.to_string()))
        .path("/")
        .max_age(time::Duration::days(30))
        .same_site(SameSite::Lax)
        .http_only(true)
        .build()
}
