//! JWT claims types

use serde::{Deserialize, Serialize};

/// Claims carried by a Fellowship identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expires at (seconds since epoch)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}
