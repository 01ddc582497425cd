//! The credential refresh loop: single writer, many readers.

use std::sync::Arc;
use std::time::Duration;

use harvester_common::{internal, Signal};
use harvester_tracing::traced;
use tokio::sync::RwLock;

use crate::error::CredentialError;
use crate::provider::{Credential, CredentialProvider};

const ERROR_RETRY_SECS: u64 = 300;

/// Holds the current credential behind a lock with one writer (the refresh
/// loop) and many readers (job handlers). Readers see an eventually
/// consistent value; a stale credential is expected to surface as a
/// retryable handler failure, by which point the refresher should have
/// published a new one.
pub struct CredentialRefresher {
    provider: Arc<dyn CredentialProvider>,
    current: Arc<RwLock<Option<Credential>>>,
}

impl CredentialRefresher {
    #[must_use]
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self {
            provider,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the current credential, fetching one eagerly if the refresh
    /// loop hasn't produced one yet.
    ///
    /// # Errors
    /// Returns [`CredentialError`] if no credential is cached and the
    /// eager fetch fails.
    pub async fn current(&self) -> Result<Credential, CredentialError> {
        if let Some(credential) = self.current.read().await.clone() {
            return Ok(credential);
        }

        let credential = self.provider.fetch().await?;
        *self.current.write().await = Some(credential.clone());
        Ok(credential)
    }

    /// Runs the refresh loop until a shutdown signal is received. Refreshes
    /// immediately on start, then sleeps for `floor(lifetime - lifetime/6)`
    /// seconds (about 83% of the credential's lifetime) before refreshing
    /// again. On a failed refresh, the previous credential is left in place
    /// and the loop retries after a fixed 300s backoff.
    ///
    /// # Errors
    /// Never returns an error from a failed refresh; only propagates if the
    /// provider itself cannot be polled at all, which doesn't happen with
    /// the current provider implementations.
    #[traced(instrument(level = harvester_common::tracing::Level::TRACE, skip_all))]
    pub async fn serve(
        self: Arc<Self>,
        mut shutdown: tokio::sync::broadcast::Receiver<Signal>,
    ) -> Result<(), CredentialError> {
        internal!("Credential refresher starting");

        loop {
            let delay = match self.refresh_once().await {
                Ok(refresh_in) => refresh_in,
                Err(e) => {
                    harvester_common::tracing::error!("Failed to refresh credential: {e}");
                    Duration::from_secs(ERROR_RETRY_SECS)
                }
            };

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                sig = shutdown.recv() => {
                    match sig {
                        Ok(Signal::Shutdown | Signal::Finalised) | Err(_) => {
                            internal!("Credential refresher received shutdown signal");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn refresh_once(&self) -> Result<Duration, CredentialError> {
        let credential = self.provider.fetch().await?;
        let lifetime = credential.lifetime_secs(chrono::Utc::now()).max(1);
        let refresh_in = (lifetime - lifetime / 6).max(1);

        internal!("Credential refreshed successfully, next refresh in {refresh_in}s");
        *self.current.write().await = Some(credential);

        Ok(Duration::from_secs(refresh_in as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProvider {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl CredentialProvider for CountingProvider {
        async fn fetch(&self) -> Result<Credential, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CredentialError::Provider("boom".into()));
            }
            Ok(Credential {
                token: "tok".into(),
                expires_at: chrono::Utc::now() + chrono::Duration::seconds(600),
            })
        }
    }

    #[tokio::test]
    async fn lazy_first_fetch_populates_current() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let refresher = CredentialRefresher::new(provider.clone());

        let credential = refresher.current().await.unwrap();
        assert_eq!(credential.token, "tok");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // Second call is served from cache, no further fetch.
        refresher.current().await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn refresh_delay_is_floor_of_83_percent_of_lifetime() {
        let lifetime: i64 = 3600;
        let refresh_in = lifetime - lifetime / 6;
        assert_eq!(refresh_in, 3000);
    }
}
