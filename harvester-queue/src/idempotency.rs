//! In-process idempotency tracking.
//!
//! This is deliberately not persisted: it protects against a message being
//! handled twice within the lifetime of a single consumer (e.g. a duplicate
//! delivery from the provider, or the consumer's own retry path racing a
//! fresh receive). Cross-restart dedup is the job of the processed-URL
//! marker table, not this store.

use std::sync::Arc;

use dashmap::DashSet;

/// Tracks which idempotency keys have already been claimed.
#[derive(Debug, Clone, Default)]
pub struct IdempotencyStore {
    claimed: Arc<DashSet<String>>,
}

impl IdempotencyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `key`. Returns `true` if this call made the claim
    /// (first time seen), `false` if it was already claimed.
    #[must_use]
    pub fn claim(&self, key: &str) -> bool {
        self.claimed.insert(key.to_string())
    }

    #[must_use]
    pub fn is_claimed(&self, key: &str) -> bool {
        self.claimed.contains(key)
    }

    pub fn release(&self, key: &str) {
        self.claimed.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_claim_succeeds_second_does_not() {
        let store = IdempotencyStore::new();
        assert!(store.claim("abc-1"));
        assert!(!store.claim("abc-1"));
        assert!(store.is_claimed("abc-1"));
    }

    #[test]
    fn release_allows_reclaiming() {
        let store = IdempotencyStore::new();
        assert!(store.claim("abc-1"));
        store.release("abc-1");
        assert!(store.claim("abc-1"));
    }
}
