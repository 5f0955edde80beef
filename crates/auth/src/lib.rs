//! Identity tokens for Fellowship
//!
//! Provides EdDSA token issuance and verification, the per-call security
//! context, and an axum extractor that works with any state implementing
//! `FromRef<S>` for `TokenService`.

mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod tokens;
mod types;

pub use claims::IdentityClaims;
pub use config::AuthConfig;
pub use context::{SecurityContext, AUTHORIZATION_KEY};
pub use error::AuthError;
pub use extractors::AuthUser;
pub use tokens::{TokenService, TOKEN_TTL_HOURS};
pub use types::AccountId;
