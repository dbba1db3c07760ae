use std::hash::{Hash, Hasher};

use axum::http::HeaderMap;

use crate::error::AppError;

/// Caller identity used for rate limiting and log correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Token(u64),
}

impl Caller {
    pub fn rate_limit_key(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::Token(fingerprint) => format!("token:{fingerprint:016x}"),
        }
    }
}

/// Check the request against the configured shared token.
///
/// With no token configured every caller is accepted; a bearer token that is
/// sent anyway still distinguishes callers for rate limiting.
pub fn authorize(headers: &HeaderMap, expected: Option<&str>) -> Result<Caller, AppError> {
    let Some(expected) = expected else {
        return Ok(match extract_bearer_token(headers) {
            Ok(token) => Caller::Token(fingerprint(token)),
            Err(_) => Caller::Anonymous,
        });
    };

    let token = extract_bearer_token(headers)?;
    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        return Err(AppError::unauthorized("Bearer token is not valid"));
    }
    Ok(Caller::Token(fingerprint(token)))
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Authorization header is not valid UTF-8"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::unauthorized("Authorization header must be `Bearer <token>`"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::unauthorized(
            "Authorization scheme must be `Bearer`",
        ));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("Bearer token is empty"));
    }

    Ok(token)
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

fn fingerprint(token: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}
