// media-resolver: turns a user-supplied media URL into a normalized list of
// downloadable formats, behind a metered API-key gate.

pub mod config;
pub mod gate;
pub mod links;
pub mod logging;
pub mod resolver;

pub use config::{ConfigError, ResolverConfig};
pub use gate::{AccessGate, ApiCredential, CredentialStore, CredentialStoreError, GateError, InMemoryCredentialStore};
pub use links::{DownloadLinkBuilder, ResolutionResponse};
pub use resolver::{
    validate_media_url, BackendId, BackendPlan, ErrorCode, MediaResolverError, ProviderId,
    ResolutionOrchestrator, ResolvedMediaFormat, ResolvedMediaInfo, ValidatedUrl,
};
