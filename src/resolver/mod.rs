// Resolver module - URL validation, back-end fallback, format normalization

pub mod errors;
pub mod extractors;
pub mod format_normalizer;
pub mod models;
pub mod orchestrator;
pub mod providers;
pub mod utils;
pub mod validator;

pub use errors::{ErrorCode, ExtractionError, MediaResolverError, ValidationError};
pub use extractors::{ExtractorConfig, MediaExtractor, RawFormat, RawResolution};
pub use models::{BackendId, ResolvedMediaFormat, ResolvedMediaInfo};
pub use orchestrator::{BackendPlan, ResolutionOrchestrator};
pub use providers::{MediaProvider, ProviderId};
pub use validator::{validate_media_url, ValidatedUrl};
