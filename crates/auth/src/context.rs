//! Security context carried by a call
//!
//! The context is the per-call bag of authentication metadata. Inbound it is
//! built from request headers; outbound (when this service calls another one)
//! it is rendered back into headers carrying the caller's token unchanged.

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::AuthError;

/// Metadata key holding the caller's credentials
pub const AUTHORIZATION_KEY: &str = "authorization";

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authorization: Option<String>,
}

impl std::fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityContext")
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl SecurityContext {
    /// Context without any credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context carrying `Bearer <token>`
    pub fn with_bearer(token: &str) -> Self {
        Self {
            authorization: Some(format!("{}{}", BEARER_PREFIX, token)),
        }
    }

    /// Replace the credentials with `Bearer <token>`
    pub fn set_bearer(&mut self, token: &str) {
        self.authorization = Some(format!("{}{}", BEARER_PREFIX, token));
    }

    /// Build from inbound request headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let authorization = headers
            .get(AUTHORIZATION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        Self { authorization }
    }

    /// Raw authorization metadata, if any
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Extract the bearer token from the authorization metadata
    pub fn bearer_token(&self) -> Result<&str, AuthError> {
        let value = self
            .authorization
            .as_deref()
            .ok_or(AuthError::MissingAuthorization)?;

        match value.strip_prefix(BEARER_PREFIX) {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            _ => Err(AuthError::InvalidAuthorizationFormat),
        }
    }

    /// Render as outbound request headers
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = self
            .authorization
            .as_deref()
            .and_then(|v| HeaderValue::from_str(v).ok())
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }
}
