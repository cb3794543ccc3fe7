//! Extraction of credentials from an incoming HTTP request.

use axum::http::{HeaderMap, header};

use crate::domain::HandshakeRequest;

const BEARER_PREFIX: &str = "Bearer ";

/// Build the request the authenticator inspects.
///
/// An explicit `token` query parameter wins over an `Authorization: Bearer` header.
pub fn handshake_request(
    path: &str,
    query_token: Option<String>,
    headers: &HeaderMap,
) -> HandshakeRequest {
    let mut request = HandshakeRequest::new(path);

    let token = query_token
        .filter(|token| !token.trim().is_empty())
        .or_else(|| bearer_token(headers));
    if let Some(token) = token {
        request = request.with_token(token);
    }

    let cookies: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    if !cookies.is_empty() {
        request = request.with_cookie_header(cookies.join("; "));
    }

    request
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
