//! Identity lookup against the external user store.
//!
//! The user store owns identities; this crate only reads them. The secret
//! is the stored password-derived key used as the HMAC key.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// An identity loaded from the user store. Read-only to this crate.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_ref: String,
    /// Password-derived HMAC key
    pub secret: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum IdentityStoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an identity by its user reference.
    async fn lookup_by_ref(
        &self,
        user_ref: &str,
    ) -> Result<Option<Identity>, IdentityStoreError>;
}

/// In-memory identity store for tests and dev deployments.
pub struct MemoryIdentityStore {
    identities: DashMap<String, Identity>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            identities: DashMap::new(),
        }
    }

    pub fn insert(&self, identity: Identity) {
        self.identities.insert(identity.user_ref.clone(), identity);
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn lookup_by_ref(
        &self,
        user_ref: &str,
    ) -> Result<Option<Identity>, IdentityStoreError> {
        Ok(self.identities.get(user_ref).map(|e| e.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_found() {
        let store = MemoryIdentityStore::new();
        store.insert(Identity {
            user_ref: "abc123".to_string(),
            secret: b"s3cr3t".to_vec(),
        });

        let identity = store
            .lookup_by_ref("abc123")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(identity.secret, b"s3cr3t");
    }

    #[tokio::test]
    async fn test_lookup_missing() {
        let store = MemoryIdentityStore::new();
        let identity = store.lookup_by_ref("nobody").await.expect("lookup");
        assert!(identity.is_none());
    }
}
