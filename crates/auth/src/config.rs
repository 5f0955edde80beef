//! Authentication configuration

use std::path::Path;

use crate::error::AuthError;

/// Key material and issuer for identity tokens.
///
/// Both keys are PEM-encoded Ed25519 keys (PKCS#8 private, SPKI public).
#[derive(Clone)]
pub struct AuthConfig {
    pub signing_key_pem: String,
    pub verifying_key_pem: String,
    pub issuer: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key_pem", &"[REDACTED]")
            .field("verifying_key_pem", &self.verifying_key_pem)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl AuthConfig {
    /// Load both keys from PEM files on disk
    pub fn from_pem_files(
        signing_key_path: impl AsRef<Path>,
        verifying_key_path: impl AsRef<Path>,
        issuer: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let signing_key_pem = std::fs::read_to_string(signing_key_path.as_ref())
            .map_err(|e| AuthError::KeyLoad(format!("signing key: {}", e)))?;
        let verifying_key_pem = std::fs::read_to_string(verifying_key_path.as_ref())
            .map_err(|e| AuthError::KeyLoad(format!("verifying key: {}", e)))?;

        Ok(Self {
            signing_key_pem,
            verifying_key_pem,
            issuer: issuer.into(),
        })
    }
}
