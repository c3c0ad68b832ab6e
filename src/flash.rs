//! One-shot notices shown to the user after a form submission.
//!
//! A flash message survives exactly one redirect: the POST handler stores it
//! in a private cookie, and the next page load reads and clears it.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};

pub(crate) const FLASH_COOKIE: &str = "flash";

/// How a flash message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FlashLevel {
    Success,
    Danger,
}

/// A notice to display once on the next page load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Flash {
    pub(crate) level: FlashLevel,
    pub(crate) message: String,
}

impl Flash {
    pub(crate) fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub(crate) fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

/// Store `flash` in the cookie jar so the next page load can display it.
///
/// If the message cannot be serialized the jar is returned unchanged and the
/// notice is dropped, which only costs the user a confirmation banner.
pub(crate) fn set_flash(jar: PrivateCookieJar, flash: &Flash) -> PrivateCookieJar {
    let payload = match serde_json::to_string(flash) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::error!("could not serialize flash message: {error}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((FLASH_COOKIE, payload))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict),
    )
}

/// Take the pending flash message out of the cookie jar, if there is one.
///
/// Returns the jar with the flash cookie removed so the message is only
/// shown once.
pub(crate) fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok());

    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));

    (jar, flash)
}
