//! Axum extractor for authenticated callers
//!
//! Generic over any state `S` where `TokenService: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use fellowship_common::Error;

use crate::context::SecurityContext;
use crate::tokens::TokenService;
use crate::types::AccountId;

/// Authenticated caller.
///
/// Extraction fails with `Unauthenticated` before the handler body runs, so
/// no handler can reach storage without a verified identity.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub AccountId);

impl<S> FromRequestParts<S> for AuthUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);
        let ctx = SecurityContext::from_headers(&parts.headers);
        let account_id = tokens.authenticate(&ctx)?;

        Ok(AuthUser(account_id))
    }
}
