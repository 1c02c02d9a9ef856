//! Remote store abstraction and backends.

mod memory;
mod sqlite;
pub mod traits;
pub mod types;

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, SanctumError};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, SecretStore, VaultStore};
pub use types::{Credential, CredentialUpdate, Link, NewCredential, Note, PinRecord};

/// Run a store call under a deadline. A stall surfaces as
/// `RemoteUnavailable`, the same as a failed call.
pub(crate) async fn within<T, F>(limit: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "store call timed out");
            Err(SanctumError::RemoteUnavailable(format!(
                "{} timed out after {}ms",
                operation,
                limit.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_within_times_out_stalled_call() {
        let result: Result<()> = within(Duration::from_secs(1), "stall", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(SanctumError::RemoteUnavailable(_))));
    }

    #[tokio::test]
    async fn test_within_passes_result_through() {
        let value = within(Duration::from_secs(1), "fast", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
