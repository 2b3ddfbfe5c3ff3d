// Extraction back-ends
//
// - yt-dlp: native binary, supports every provider (primary)
// - rusty-ytdl: pure Rust YouTube client (secondary, youtube only)
//
// Which back-ends run for which provider is decided by the orchestrator's
// BackendPlan, not by the adapters.

mod traits;
mod youtube;
mod ytdlp;

#[cfg(test)]
pub use traits::MockMediaExtractor;
pub use traits::{
    ExtractorConfig, MediaExtractor, RawFormat, RawResolution, RustyYtdlFormat, YtDlpFormat,
};
pub use youtube::RustyYtdlExtractor;
pub use ytdlp::YtDlpExtractor;
