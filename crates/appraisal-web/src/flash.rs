//! One-shot messages carried across a redirect in a cookie.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    fn tag(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

/// A message queued for the next page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Banner class for the page frame.
    pub fn class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "banner-flash",
            FlashKind::Error => "banner-error",
        }
    }

    fn encode(&self) -> String {
        format!("{}:{}", self.kind.tag(), urlencoding::encode(&self.message))
    }

    fn decode(value: &str) -> Option<Self> {
        let (tag, message) = value.split_once(':')?;
        let kind = match tag {
            "success" => FlashKind::Success,
            "error" => FlashKind::Error,
            _ => return None,
        };
        let message = urlencoding::decode(message).ok()?.into_owned();
        (!message.is_empty()).then_some(Self { kind, message })
    }
}

/// Queue `flash` for the next page render.
pub fn set_flash(jar: CookieJar, flash: &Flash) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, flash.encode()))
        .path("/")
        .max_age(time::Duration::minutes(5))
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Read and clear the queued message.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::decode(c.value()));

    match flash {
        Some(flash) => (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), Some(flash)),
        None => (jar, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_round_trip() {
        let jar = set_flash(CookieJar::new(), &Flash::success("Cycle deleted; 3 assignments removed"));
        let (jar, flash) = take_flash(jar);
        let flash = flash.unwrap();
        assert_eq!(flash.message, "Cycle deleted; 3 assignments removed");
        assert_eq!(flash.class(), "banner-flash");
        assert!(take_flash(jar).1.is_none());
    }

    #[test]
    fn test_error_flash_keeps_its_kind() {
        let jar = set_flash(CookieJar::new(), &Flash::error("Failed to publish appraisal: boom"));
        let (_, flash) = take_flash(jar);
        let flash = flash.unwrap();
        assert_eq!(flash.kind, FlashKind::Error);
        assert_eq!(flash.class(), "banner-error");
    }

    #[test]
    fn test_untagged_cookie_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "plain"));
        assert!(take_flash(jar).1.is_none());
    }
}
