//! Membership and invite services
//!
//! Every operation runs as one unit of work under the configured storage
//! deadline. Nothing is retried; a failed or cancelled operation drops its
//! unit of work, which rolls it back.

mod invites;
mod membership;

pub use invites::InviteWorkflow;
pub use membership::{MembershipManager, RemovalOutcome};

use std::future::Future;
use std::time::Duration;

use fellowship_common::{Error, RepositoryError, Result};

use crate::repository::{Store, UnitOfWork};

/// Map a storage failure that the caller cannot act on to `Internal`
pub(crate) fn storage_failure(action: &'static str) -> impl FnOnce(RepositoryError) -> Error {
    move |err| {
        tracing::error!(error = %err, action, "Storage operation failed");
        Error::Internal(format!("Failed to {}", action))
    }
}

pub(crate) async fn begin(store: &dyn Store) -> Result<Box<dyn UnitOfWork>> {
    store
        .begin()
        .await
        .map_err(storage_failure("begin unit of work"))
}

pub(crate) async fn commit(uow: &mut dyn UnitOfWork) -> Result<()> {
    uow.commit()
        .await
        .map_err(storage_failure("commit unit of work"))
}

/// Run `operation` under `timeout`; on expiry the in-flight unit of work is
/// dropped and the call fails with `DeadlineExceeded`.
pub(crate) async fn with_deadline<T, F>(timeout: Duration, name: &'static str, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation = name, timeout_ms = timeout.as_millis() as u64, "Deadline exceeded");
            Err(Error::DeadlineExceeded(format!(
                "{} did not complete within {}ms",
                name,
                timeout.as_millis()
            )))
        }
    }
}
