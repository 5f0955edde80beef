//! Authentication errors

use fellowship_common::Error;

/// Authentication error.
///
/// The variants exist for logging and tests only. Callers always receive the
/// same `Unauthenticated` outcome for every token failure so that validation
/// internals are not leaked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("authorization metadata missing")]
    MissingAuthorization,

    #[error("authorization metadata is not a bearer token")]
    InvalidAuthorizationFormat,

    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("token subject is not an account id")]
    InvalidSubject,

    #[error("failed to load key material: {0}")]
    KeyLoad(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthorization
            | AuthError::InvalidAuthorizationFormat
            | AuthError::InvalidToken(_)
            | AuthError::InvalidSubject => {
                Error::Unauthenticated("Invalid or missing credentials".to_string())
            }
            AuthError::KeyLoad(msg) | AuthError::Signing(msg) => Error::Internal(msg),
        }
    }
}
