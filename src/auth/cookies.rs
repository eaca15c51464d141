// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth cookie transport.
//!
//! The console stores the caller's token in an HTTP-only cookie. This module
//! reads it back from request headers and builds the `Set-Cookie` values that
//! store or clear it.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue, Uri};
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, CookieJar, SameSite};

/// Name of the cookie carrying the caller's token.
pub const CADENCE_AUTH_COOKIE_NAME: &str = "cadence-authorization";

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Answers "what is the value of the named cookie".
pub trait CookieReader: Send + Sync {
    fn get_cookie(&self, name: &str) -> Option<String>;
}

impl CookieReader for CookieJar {
    fn get_cookie(&self, name: &str) -> Option<String> {
        self.get(name).map(|c| c.value().to_string())
    }
}

impl CookieReader for HeaderMap {
    fn get_cookie(&self, name: &str) -> Option<String> {
        parse_cookies(self).get_cookie(name)
    }
}

/// Collect every cookie from all `Cookie` headers. Unparsable headers and
/// fragments are skipped.
pub fn parse_cookies(headers: &HeaderMap) -> CookieJar {
    let mut cookies = CookieJar::new();
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for chunk in raw.split(';').map(str::trim) {
            if let Ok(cookie) = Cookie::parse(chunk) {
                cookies.add_original(cookie.into_owned());
            }
        }
    }
    cookies
}

/// Trim a submitted token and drop a leading `Bearer ` scheme (any case).
pub fn normalize_token_value(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.get(..6) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {
            let rest = &trimmed[6..];
            if rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                trimmed
            }
        }
        _ => trimmed,
    }
}

/// Whether the cookie should carry `Secure`.
///
/// The first `x-forwarded-proto` entry wins when present; otherwise the
/// request URI scheme decides.
pub fn is_secure_request(headers: &HeaderMap, uri: &Uri) -> bool {
    let forwarded = headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|proto| proto.trim().to_ascii_lowercase())
        .filter(|proto| !proto.is_empty());

    match forwarded {
        Some(proto) => proto == "https",
        None => uri.scheme_str() == Some("https"),
    }
}

// RFC 6265 cookie-octet
fn is_cookie_octet(c: char) -> bool {
    matches!(c, '\x21' | '\x23'..='\x2B' | '\x2D'..='\x3A' | '\x3C'..='\x5B' | '\x5D'..='\x7E')
}

fn base_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((CADENCE_AUTH_COOKIE_NAME, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .build()
}

/// `Set-Cookie` value storing `token`; `None` if the token cannot be carried
/// in a cookie value without quoting.
pub fn auth_cookie_header_value(token: &str, secure: bool) -> Option<HeaderValue> {
    if !token.chars().all(is_cookie_octet) {
        return None;
    }
    HeaderValue::from_str(&base_cookie(token.to_string(), secure).to_string()).ok()
}

/// `Set-Cookie` value that expires the auth cookie immediately.
pub fn clear_auth_cookie_header_value(secure: bool) -> Option<HeaderValue> {
    let mut cookie = base_cookie(String::new(), secure);
    cookie.set_max_age(Duration::ZERO);
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    HeaderValue::from_str(&cookie.to_string()).ok()
}
