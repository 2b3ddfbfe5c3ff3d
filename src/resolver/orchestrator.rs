// Resolution orchestrator with fallback across back-ends
//
// Strategy:
// 1. Validate and detect the provider
// 2. Look up the ordered back-end list for that provider in the BackendPlan
// 3. First success wins; failures are recorded per back-end and the next
//    one is tried
// 4. All failed -> RESOLUTION_FAILED, cause = primary's error if recorded

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::errors::{ExtractionError, MediaResolverError};
use super::extractors::{ExtractorConfig, MediaExtractor, RustyYtdlExtractor, YtDlpExtractor};
use super::format_normalizer::normalize;
use super::models::{BackendId, ResolvedMediaInfo, UNTITLED};
use super::providers::ProviderId;
use super::validator::{validate_media_url, ValidatedUrl};

/// Provider -> ordered back-end list. Policy as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendPlan {
    /// Used for providers without an override
    pub default: Vec<BackendId>,
    pub overrides: BTreeMap<ProviderId, Vec<BackendId>>,
}

impl Default for BackendPlan {
    fn default() -> Self {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            ProviderId::Youtube,
            vec![BackendId::YtDlp, BackendId::RustyYtdl],
        );
        Self {
            default: vec![BackendId::YtDlp],
            overrides,
        }
    }
}

impl BackendPlan {
    pub fn for_provider(&self, provider: ProviderId) -> &[BackendId] {
        self.overrides
            .get(&provider)
            .map(Vec::as_slice)
            .unwrap_or(self.default.as_slice())
    }

    pub fn with_override(mut self, provider: ProviderId, backends: Vec<BackendId>) -> Self {
        self.overrides.insert(provider, backends);
        self
    }

    /// Every list must name at least one back-end.
    pub fn validate(&self) -> Result<(), String> {
        if self.default.is_empty() {
            return Err("backend plan: default list is empty".to_string());
        }
        if let Some((provider, _)) = self.overrides.iter().find(|(_, list)| list.is_empty()) {
            return Err(format!("backend plan: list for {} is empty", provider));
        }
        Ok(())
    }
}

/// Orchestrator over a set of registered back-ends
pub struct ResolutionOrchestrator {
    extractors: HashMap<BackendId, Arc<dyn MediaExtractor>>,
    plan: BackendPlan,
}

impl ResolutionOrchestrator {
    pub fn new(plan: BackendPlan) -> Self {
        Self {
            extractors: HashMap::new(),
            plan,
        }
    }

    /// Orchestrator with the bundled yt-dlp and rusty-ytdl back-ends.
    pub fn with_default_backends(config: &ExtractorConfig, plan: BackendPlan) -> Self {
        let mut orchestrator = Self::new(plan);
        orchestrator.register(Arc::new(YtDlpExtractor::new(config.clone())));
        orchestrator.register(Arc::new(RustyYtdlExtractor::new(config)));
        orchestrator
    }

    /// Register a back-end, replacing any with the same id.
    pub fn register(&mut self, extractor: Arc<dyn MediaExtractor>) {
        self.extractors.insert(extractor.backend(), extractor);
    }

    pub fn plan(&self) -> &BackendPlan {
        &self.plan
    }

    /// Registered back-ends for `provider`, in plan order.
    pub fn attempt_order(&self, provider: ProviderId) -> Vec<Arc<dyn MediaExtractor>> {
        self.plan
            .for_provider(provider)
            .iter()
            .filter_map(|id| {
                let extractor = self.extractors.get(id).cloned();
                if extractor.is_none() {
                    warn!(backend = %id, provider = %provider, "planned backend is not registered, skipping");
                }
                extractor
            })
            .collect()
    }

    /// Validate `url` and resolve it.
    pub async fn resolve_media(&self, url: &str) -> Result<ResolvedMediaInfo, MediaResolverError> {
        let validated = validate_media_url(url)?;
        self.resolve_validated(&validated).await
    }

    pub async fn resolve_validated(
        &self,
        url: &ValidatedUrl,
    ) -> Result<ResolvedMediaInfo, MediaResolverError> {
        let provider = url.provider_id();
        let attempts = self.attempt_order(provider);
        let primary = attempts.first().map(|e| e.backend());

        let mut errors: HashMap<BackendId, ExtractionError> = HashMap::new();
        let mut last_failed = None;

        for extractor in &attempts {
            let backend = extractor.backend();
            info!(backend = %backend, provider = %provider, "trying backend");

            match extractor.resolve(url).await {
                Ok(raw) => {
                    let formats = normalize(&raw.formats);
                    info!(
                        backend = %backend,
                        formats = formats.len(),
                        fallback = !errors.is_empty(),
                        "backend succeeded"
                    );
                    return Ok(ResolvedMediaInfo {
                        title: raw
                            .title
                            .filter(|t| !t.trim().is_empty())
                            .unwrap_or_else(|| UNTITLED.to_string()),
                        provider,
                        requested_url: url.as_str().to_string(),
                        formats,
                        library: backend,
                    });
                }
                Err(e) => {
                    warn!(backend = %backend, provider = %provider, error = %e, "backend failed");
                    errors.insert(backend, e);
                    last_failed = Some(backend);
                }
            }
        }

        let cause_backend = primary
            .filter(|id| errors.contains_key(id))
            .or(last_failed);
        let cause = cause_backend.and_then(|id| errors.remove(&id));

        error!(
            url = %url,
            attempted = attempts.len(),
            cause_backend = ?cause_backend,
            cause = ?cause,
            "all backends failed"
        );

        Err(MediaResolverError::resolution_failed(cause_backend, cause))
    }
}
