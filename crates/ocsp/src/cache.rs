// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-CA signing material cache backing OCSP response generation.
//!
//! Reloads are rare, operator-triggered events (key rotation, new CA
//! activation), so the cache replaces its whole snapshot instead of
//! invalidating entries one by one. The replacement map is built with no
//! lock held and published with a single swap, so readers observe either
//! the complete old snapshot or the complete new one, never a mix, and
//! response generation against the old snapshot proceeds during a reload.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{error, info};

use crate::store::{CaStore, CaStoreError};
use crate::token_chain::{CryptoTokenAndChain, IssuerId};

/// A point-in-time view of the cache. Holders keep signing against it
/// even if the cache is reloaded underneath them.
pub type CacheSnapshot = Arc<HashMap<IssuerId, Arc<CryptoTokenAndChain>>>;

pub struct TokenChainCache {
    store: Arc<dyn CaStore>,
    snapshot: RwLock<CacheSnapshot>,
}

impl TokenChainCache {
    /// An empty cache over the authoritative CA store. Call `reload` to
    /// populate it.
    pub fn new(store: Arc<dyn CaStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// The current snapshot. Point-in-time: concurrent reloads are not
    /// reflected in the returned value.
    pub fn snapshot(&self) -> CacheSnapshot {
        // A poisoned lock still holds a fully published snapshot; the
        // only write ever performed is the whole-`Arc` swap in `reload`.
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn cache_values(&self) -> Vec<Arc<CryptoTokenAndChain>> {
        self.snapshot().values().cloned().collect()
    }

    pub fn lookup(&self, issuer: &IssuerId) -> Option<Arc<CryptoTokenAndChain>> {
        self.snapshot().get(issuer).cloned()
    }

    /// Synchronously rebuilds the cache from the CA store and publishes
    /// the result atomically. All-or-nothing: if any CA fails to load the
    /// previous snapshot stays authoritative and this returns an error.
    /// Returns the number of cached issuers.
    pub fn reload(&self) -> Result<usize, CacheReloadError> {
        let loaded = self.store.load_all().map_err(|source| {
            error!(error = %source, "CA store load failed, keeping previous snapshot");
            CacheReloadError::Store(source)
        })?;

        let mut next = HashMap::with_capacity(loaded.len());
        for token in loaded {
            let issuer = token.issuer_id();
            if next.insert(issuer, Arc::new(token)).is_some() {
                error!(%issuer, "duplicate issuer in CA store, keeping previous snapshot");
                return Err(CacheReloadError::DuplicateIssuer { issuer });
            }
        }

        let count = next.len();
        let next = Arc::new(next);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        info!(issuers = count, "token and chain cache reloaded");
        Ok(count)
    }
}

#[derive(Error, Debug)]
pub enum CacheReloadError {
    #[error(transparent)]
    Store(#[from] CaStoreError),
    #[error("CA store returned issuer {issuer} more than once")]
    DuplicateIssuer { issuer: IssuerId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pki::test_helpers::CaHierarchy;

    struct FailingStore;

    impl CaStore for FailingStore {
        fn load_all(&self) -> Result<Vec<CryptoTokenAndChain>, CaStoreError> {
            Err(CaStoreError::Io {
                path: "/nonexistent".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    struct SingleCaStore {
        ca: CaHierarchy,
    }

    impl CaStore for SingleCaStore {
        fn load_all(&self) -> Result<Vec<CryptoTokenAndChain>, CaStoreError> {
            let token = CryptoTokenAndChain::new(self.ca.issuing_key.clone(), self.ca.chain())
                .map_err(|source| CaStoreError::Token {
                    ca: "ca1".to_string(),
                    source,
                })?;
            Ok(vec![token])
        }
    }

    struct DuplicateStore {
        ca: CaHierarchy,
    }

    impl CaStore for DuplicateStore {
        fn load_all(&self) -> Result<Vec<CryptoTokenAndChain>, CaStoreError> {
            let make = || {
                CryptoTokenAndChain::new(self.ca.issuing_key.clone(), self.ca.chain()).map_err(
                    |source| CaStoreError::Token {
                        ca: "ca1".to_string(),
                        source,
                    },
                )
            };
            Ok(vec![make()?, make()?])
        }
    }

    #[test]
    fn fresh_cache_is_empty_until_reloaded() {
        let store = Arc::new(SingleCaStore {
            ca: CaHierarchy::issuing_under_root("ca1"),
        });
        let cache = TokenChainCache::new(store);
        assert!(cache.cache_values().is_empty());

        let count = cache.reload().unwrap();
        assert_eq!(count, 1);
        assert_eq!(cache.cache_values().len(), 1);
    }

    #[test]
    fn lookup_finds_loaded_issuer_only() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        let issuer = IssuerId::from(ca.issuing_key.public_key());
        let cache = TokenChainCache::new(Arc::new(SingleCaStore { ca }));
        cache.reload().unwrap();

        assert!(cache.lookup(&issuer).is_some());
        let absent = IssuerId::from(pki::KeyPair::new_random().public_key());
        assert!(cache.lookup(&absent).is_none());
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        let issuer = IssuerId::from(ca.issuing_key.public_key());
        let good_store = Arc::new(SingleCaStore { ca });

        let cache = TokenChainCache::new(good_store);
        cache.reload().unwrap();

        let failing = TokenChainCache {
            store: Arc::new(FailingStore),
            snapshot: RwLock::new(cache.snapshot()),
        };
        failing.reload().unwrap_err();
        assert!(failing.lookup(&issuer).is_some());
    }

    #[test]
    fn duplicate_issuer_fails_reload() {
        let cache = TokenChainCache::new(Arc::new(DuplicateStore {
            ca: CaHierarchy::issuing_under_root("ca1"),
        }));
        let err = cache.reload().unwrap_err();
        assert!(matches!(err, CacheReloadError::DuplicateIssuer { .. }));
        assert!(cache.cache_values().is_empty());
    }

    #[test]
    fn snapshot_taken_before_reload_is_unaffected_by_it() {
        let ca = CaHierarchy::issuing_under_root("ca1");
        let issuer = IssuerId::from(ca.issuing_key.public_key());
        let cache = TokenChainCache::new(Arc::new(SingleCaStore { ca }));
        cache.reload().unwrap();

        let before = cache.snapshot();
        cache.reload().unwrap();

        // The old snapshot still serves its original entries.
        assert!(before.contains_key(&issuer));
    }
}
