//! Signed cookie storage for the cart blob.
//!
//! The cart lives in a single cookie, `cart_items`, whose value is the
//! percent-encoded JSON array of line items, signed with a key derived from
//! `STOREFRONT_CART_SECRET`. A cookie with a bad signature reads as no cart.
//!
//! Browsers drop cookies over [`MAX_COOKIE_BYTES`]; a cart that grows past it
//! is still written but logged, since the browser keeps the previous cart.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, CookieJar, Key, SameSite};

use tracing::warn;

use ecommerce_core::CartStorage;

use crate::state::AppState;

/// Name of the cart cookie.
pub const CART_COOKIE_NAME: &str = "cart_items";

/// Cart cookie lifetime (30 days).
pub const CART_COOKIE_MAX_AGE_MINUTES: i64 = 60 * 24 * 30;

/// Largest `Set-Cookie` value browsers are required to keep (RFC 6265).
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Derive the cookie signing key from the configured secret.
#[must_use]
pub fn derive_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Request-scoped cart cookie jar.
///
/// Extract it in a handler, hand it to a [`super::CartStore`], then return it
/// as part of the response so the changed cookie is sent back.
pub struct CartCookies {
    jar: CookieJar,
    key: Key,
    secure: bool,
}

impl CartCookies {
    /// Read the cookies sent with a request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, key: Key, secure: bool) -> Self {
        let mut jar = CookieJar::new();
        for cookie in headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .flatten()
        {
            jar.add_original(cookie.into_owned());
        }

        Self { jar, key, secure }
    }

    /// `Set-Cookie` values for every cookie changed in this request.
    #[must_use]
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        self.jar
            .delta()
            .filter_map(|cookie| HeaderValue::from_str(&cookie.to_string()).ok())
            .collect()
    }

    /// Length of the pending cart `Set-Cookie` value, if the cart was written.
    #[must_use]
    pub fn cart_cookie_len(&self) -> Option<usize> {
        self.jar
            .delta()
            .find(|cookie| cookie.name() == CART_COOKIE_NAME)
            .map(|cookie| cookie.to_string().len())
    }
}

impl CartStorage for CartCookies {
    fn load(&self) -> Option<String> {
        let cookie = self.jar.signed(&self.key).get(CART_COOKIE_NAME)?;
        urlencoding::decode(cookie.value())
            .ok()
            .map(std::borrow::Cow::into_owned)
    }

    fn store(&mut self, blob: String) {
        let cookie = Cookie::build((CART_COOKIE_NAME, urlencoding::encode(&blob).into_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::minutes(CART_COOKIE_MAX_AGE_MINUTES));

        self.jar.signed_mut(&self.key).add(cookie);

        if let Some(len) = self.cart_cookie_len()
            && len > MAX_COOKIE_BYTES
        {
            warn!(
                len,
                limit = MAX_COOKIE_BYTES,
                "Cart cookie exceeds browser size limit and will likely be dropped"
            );
        }
    }

    fn forget(&mut self) {
        self.jar.remove(Cookie::build(CART_COOKIE_NAME).path("/"));
    }
}

impl<C: Send + Sync> FromRequestParts<AppState<C>> for CartCookies {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(
            &parts.headers,
            state.cart_key().clone(),
            state.config().is_secure(),
        ))
    }
}

impl IntoResponseParts for CartCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for value in self.set_cookie_headers() {
            res.headers_mut().append(SET_COOKIE, value);
        }
        Ok(res)
    }
}
