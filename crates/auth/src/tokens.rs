//! Identity token issuance and verification
//!
//! Tokens are EdDSA (Ed25519) JWTs. The private key only ever lives inside a
//! [`TokenService`] built from configuration; verification is pure and the
//! service is freely shareable across concurrent calls.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::IdentityClaims;
use crate::config::AuthConfig;
use crate::context::SecurityContext;
use crate::error::AuthError;
use crate::types::AccountId;

/// Lifetime of every issued token. Verification allows no clock leeway.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Issues and verifies signed identity tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_ed_pem(config.signing_key_pem.as_bytes())
            .map_err(|e| AuthError::KeyLoad(format!("signing key: {}", e)))?;
        let decoding_key = DecodingKey::from_ed_pem(config.verifying_key_pem.as_bytes())
            .map_err(|e| AuthError::KeyLoad(format!("verifying key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
        })
    }

    /// Issue a token for `account_id`, valid for [`TOKEN_TTL_HOURS`]
    pub fn issue_token(&self, account_id: AccountId) -> Result<String, AuthError> {
        self.issue_token_at(account_id, Utc::now())
    }

    pub(crate) fn issue_token_at(
        &self,
        account_id: AccountId,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = IdentityClaims {
            sub: account_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Validate a raw token and return the account it asserts
    pub fn verify(&self, token: &str) -> Result<AccountId, AuthError> {
        let token_data =
            decode::<IdentityClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                AuthError::InvalidToken(e.to_string())
            })?;

        token_data
            .claims
            .sub
            .parse::<AccountId>()
            .map_err(|_| AuthError::InvalidSubject)
    }

    /// Validate the token carried by a call's security context
    pub fn verify_token(&self, ctx: &SecurityContext) -> Result<AccountId, AuthError> {
        let token = ctx.bearer_token()?;
        self.verify(token)
    }

    /// Resolve the caller's identity, collapsing every failure into
    /// `Unauthenticated`
    pub fn authenticate(&self, ctx: &SecurityContext) -> fellowship_common::Result<AccountId> {
        self.verify_token(ctx).map_err(|e| {
            tracing::debug!(reason = %e, "Rejected unauthenticated call");
            fellowship_common::Error::from(e)
        })
    }

    /// Build the context for a downstream call made on the caller's behalf.
    ///
    /// The token is forwarded verbatim: it is neither re-signed nor widened.
    pub fn attach_token(ctx: &SecurityContext, token: &str) -> SecurityContext {
        let mut downstream = ctx.clone();
        downstream.set_bearer(token);
        downstream
    }
}
