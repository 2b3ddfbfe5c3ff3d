// API credentials and the store they live in

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;

/// A metered API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredential {
    pub id: String,
    pub key: String,
    /// Owning user/subject
    pub subject: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub usage_count: u64,
    pub usage_limit: u64,
}

fn default_active() -> bool {
    true
}

impl ApiCredential {
    pub fn new(id: impl Into<String>, key: impl Into<String>, subject: impl Into<String>, usage_limit: u64) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            subject: subject.into(),
            active: true,
            expires_at: None,
            usage_count: 0,
            usage_limit,
        }
    }

    pub fn with_expiry(mut self, expires_at: Option<OffsetDateTime>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn with_usage(mut self, usage_count: u64) -> Self {
        self.usage_count = usage_count;
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at.map_or(false, |expiry| expiry <= now)
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_count >= self.usage_limit
    }

    pub fn remaining(&self) -> u64 {
        self.usage_limit.saturating_sub(self.usage_count)
    }
}

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Duplicate API key for credential {0}")]
    DuplicateKey(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read credentials: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid credentials file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// External credential store.
///
/// `increment_usage` must be a single conditional update
/// ("increment if below limit"), never a read followed by a write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_key(&self, key: &str) -> Result<Option<ApiCredential>, CredentialStoreError>;

    async fn get(&self, id: &str) -> Result<ApiCredential, CredentialStoreError>;

    /// Consume one unit. `Ok(false)` when the limit was already reached.
    async fn increment_usage(&self, id: &str) -> Result<bool, CredentialStoreError>;
}

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<String, ApiCredential>,
    key_index: HashMap<String, String>,
}

/// Process-local store; the conditional increment runs under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_credentials(
        credentials: impl IntoIterator<Item = ApiCredential>,
    ) -> Result<Self, CredentialStoreError> {
        let mut inner = Inner::default();
        for credential in credentials {
            if inner.key_index.contains_key(&credential.key) {
                return Err(CredentialStoreError::DuplicateKey(credential.id));
            }
            inner
                .key_index
                .insert(credential.key.clone(), credential.id.clone());
            inner.by_id.insert(credential.id.clone(), credential);
        }
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    /// Load a JSON array of credentials.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, CredentialStoreError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let credentials: Vec<ApiCredential> = serde_json::from_str(&content)?;
        debug!(path = %path.display(), count = credentials.len(), "loaded credentials");
        Self::from_credentials(credentials)
    }

    /// Insert or replace a credential (administrative flows).
    pub async fn upsert(&self, credential: ApiCredential) -> Result<(), CredentialStoreError> {
        let mut inner = self.inner.write().await;
        if let Some(owner) = inner.key_index.get(&credential.key) {
            if owner != &credential.id {
                return Err(CredentialStoreError::DuplicateKey(credential.id));
            }
        }
        if let Some(previous) = inner.by_id.get(&credential.id).map(|c| c.key.clone()) {
            inner.key_index.remove(&previous);
        }
        inner
            .key_index
            .insert(credential.key.clone(), credential.id.clone());
        inner.by_id.insert(credential.id.clone(), credential);
        Ok(())
    }

    /// Change the usage limit (billing flows).
    pub async fn set_usage_limit(&self, id: &str, usage_limit: u64) -> Result<(), CredentialStoreError> {
        let mut inner = self.inner.write().await;
        let credential = inner
            .by_id
            .get_mut(id)
            .ok_or_else(|| CredentialStoreError::NotFound(id.to_string()))?;
        credential.usage_limit = usage_limit;
        Ok(())
    }

    pub async fn snapshot(&self) -> Vec<ApiCredential> {
        let inner = self.inner.read().await;
        let mut all: Vec<_> = inner.by_id.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<ApiCredential>, CredentialStoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .key_index
            .get(key)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn get(&self, id: &str) -> Result<ApiCredential, CredentialStoreError> {
        let inner = self.inner.read().await;
        inner
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| CredentialStoreError::NotFound(id.to_string()))
    }

    async fn increment_usage(&self, id: &str) -> Result<bool, CredentialStoreError> {
        let mut inner = self.inner.write().await;
        let credential = inner
            .by_id
            .get_mut(id)
            .ok_or_else(|| CredentialStoreError::NotFound(id.to_string()))?;
        if credential.is_exhausted() {
            return Ok(false);
        }
        credential.usage_count += 1;
        Ok(true)
    }
}
