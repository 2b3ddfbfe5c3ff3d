// Usage-metered access gate in front of the orchestrator
//
// Order of checks:
// 1. Credential exists, is active, is not expired
// 2. Quota not exhausted
// 3. One unit consumed through the store's conditional increment
// 4. Resolution
//
// A unit is charged on the attempt: a resolution failure after step 3 is
// not refunded.

use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::credentials::{ApiCredential, CredentialStore, CredentialStoreError};
use crate::resolver::{ErrorCode, MediaResolverError, ResolutionOrchestrator, ResolvedMediaInfo};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("The API key is missing, unknown or disabled.")]
    InvalidApiKey,

    #[error("This API key has expired. Renew your subscription to keep using the service.")]
    ApiKeyExpired,

    #[error("Usage limit of {limit} requests reached. Upgrade your plan to continue.")]
    UsageLimitExceeded { limit: u64 },

    #[error("The credential service is temporarily unavailable. Please try again later.")]
    Store(#[source] CredentialStoreError),

    #[error(transparent)]
    Resolution(#[from] MediaResolverError),
}

impl GateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidApiKey => ErrorCode::InvalidApiKey,
            Self::ApiKeyExpired => ErrorCode::ApiKeyExpired,
            Self::UsageLimitExceeded { .. } => ErrorCode::UsageLimitExceeded,
            Self::Store(_) => ErrorCode::CredentialStoreError,
            Self::Resolution(e) => e.code,
        }
    }
}

impl From<CredentialStoreError> for GateError {
    fn from(err: CredentialStoreError) -> Self {
        Self::Store(err)
    }
}

pub struct AccessGate {
    store: Arc<dyn CredentialStore>,
    orchestrator: Arc<ResolutionOrchestrator>,
}

impl AccessGate {
    pub fn new(store: Arc<dyn CredentialStore>, orchestrator: Arc<ResolutionOrchestrator>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    pub fn orchestrator(&self) -> &Arc<ResolutionOrchestrator> {
        &self.orchestrator
    }

    /// Look up `api_key` and run the credential and quota checks.
    pub async fn check_credential(&self, api_key: &str) -> Result<ApiCredential, GateError> {
        let key = api_key.trim();
        if key.is_empty() {
            debug!("rejected: empty api key");
            return Err(GateError::InvalidApiKey);
        }

        let Some(credential) = self.store.find_by_key(key).await? else {
            debug!("rejected: unknown api key");
            return Err(GateError::InvalidApiKey);
        };

        if !credential.active {
            info!(credential = %credential.id, "rejected: credential inactive");
            return Err(GateError::InvalidApiKey);
        }

        if credential.is_expired_at(OffsetDateTime::now_utc()) {
            info!(credential = %credential.id, "rejected: credential expired");
            return Err(GateError::ApiKeyExpired);
        }

        if credential.is_exhausted() {
            info!(
                credential = %credential.id,
                usage = credential.usage_count,
                limit = credential.usage_limit,
                "rejected: usage limit reached"
            );
            return Err(GateError::UsageLimitExceeded {
                limit: credential.usage_limit,
            });
        }

        Ok(credential)
    }

    /// Authorize, charge one unit, then resolve.
    pub async fn authorize_and_resolve(
        &self,
        api_key: &str,
        url: &str,
    ) -> Result<ResolvedMediaInfo, GateError> {
        let credential = self.check_credential(api_key).await?;

        if !self.store.increment_usage(&credential.id).await? {
            info!(credential = %credential.id, "rejected: quota consumed concurrently");
            return Err(GateError::UsageLimitExceeded {
                limit: credential.usage_limit,
            });
        }

        match self.store.get(&credential.id).await {
            Ok(current) => info!(
                credential = %current.id,
                subject = %current.subject,
                usage = current.usage_count,
                remaining = current.remaining(),
                "quota charged"
            ),
            Err(e) => warn!(credential = %credential.id, error = %e, "re-reading credential failed"),
        }

        Ok(self.orchestrator.resolve_media(url).await?)
    }

    /// Same checks as `authorize_and_resolve` without consuming quota.
    pub async fn preview(&self, api_key: &str, url: &str) -> Result<ResolvedMediaInfo, GateError> {
        let credential = self.check_credential(api_key).await?;
        debug!(credential = %credential.id, "preview, quota untouched");
        Ok(self.orchestrator.resolve_media(url).await?)
    }
}
