//! Small helpers for input normalization and cookie extraction.

use axum::http::HeaderMap;
use regex::Regex;

/// Normalize a username or email for lookup/uniqueness checks.
pub(crate) fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Usernames are lowercase, start alphanumeric, and stay URL-safe.
pub(crate) fn valid_username(username_normalized: &str) -> bool {
    Regex::new(r"^[a-z0-9][a-z0-9_.-]{2,31}$")
        .is_ok_and(|regex| regex.is_match(username_normalized))
}

/// Pull a single cookie value out of the `Cookie` request header.
///
/// Returns `None` when the header or the named cookie is absent.
pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (cookie_name, cookie_value) = pair.trim().split_once('=')?;
            if cookie_name == name && !cookie_value.is_empty() {
                Some(cookie_value.to_string())
            } else {
                None
            }
        })
        .next()
}
