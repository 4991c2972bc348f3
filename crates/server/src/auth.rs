//! Bearer token authentication for routes that download or mutate.

use crate::AppState;
use crate::error::{ApiError, ErrorKind};
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use std::collections::HashMap;

/// Decides who, if anyone, a bearer token belongs to.
pub trait Authenticator: Send + Sync {
    /// Name of the principal holding `token`, `None` if it is not accepted.
    fn authenticate(&self, token: &str) -> Option<String>;
}

/// Fixed set of named API tokens.
#[derive(Clone, Debug, Default)]
pub struct TokenAuthenticator {
    by_token: HashMap<String, String>,
}

impl TokenAuthenticator {
    /// Build from `(name, token)` pairs.
    pub fn new<N, T>(tokens: impl IntoIterator<Item = (N, T)>) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        let by_token = tokens.into_iter().map(|(name, token)| (token.into(), name.into())).collect();
        Self { by_token }
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, token: &str) -> Option<String> {
        self.by_token.get(token).cloned()
    }
}

/// Extractor that rejects the request with `401` unless it carries an
/// accepted `Authorization: Bearer` token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authenticated(pub String);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .and_then(|token| state.auth.authenticate(token));
        match principal {
            Some(name) => {
                tracing::debug!(principal = %name, "request authenticated");
                Ok(Self(name))
            },
            None => Err(ApiError::from(ErrorKind::Unauthorized)),
        }
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
