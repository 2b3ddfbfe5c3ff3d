// MediaExtractor trait and raw back-end vocabularies

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::resolver::errors::ExtractionError;
use crate::resolver::models::BackendId;
use crate::resolver::validator::ValidatedUrl;

/// Configuration shared by the extraction back-ends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Explicit yt-dlp binary; discovered when unset
    pub ytdlp_path: Option<String>,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<String>,
    /// Use cookies from browser (Chrome)
    pub cookies_from_browser: bool,
    /// Per back-end call timeout in seconds
    pub timeout_seconds: u32,
    /// YouTube player client (android, web, tv)
    pub player_client: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            proxy: None,
            cookies_path: None,
            cookies_from_browser: false,
            timeout_seconds: 30,
            player_client: None,
        }
    }
}

impl ExtractorConfig {
    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<String>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_cookies_from_browser(mut self, enabled: bool) -> Self {
        self.cookies_from_browser = enabled;
        self
    }

    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_player_client(mut self, client: Option<String>) -> Self {
        self.player_client = client;
        self
    }
}

/// Format record in yt-dlp's `--dump-json` vocabulary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YtDlpFormat {
    /// Format ID (e.g., "137", "140")
    pub format_id: Option<String>,
    /// File extension (mp4, webm, m4a)
    pub ext: Option<String>,
    /// Resolution string (e.g., "1920x1080", "audio only")
    pub resolution: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    /// Approximate file size (when exact is unknown)
    pub filesize_approx: Option<u64>,
    /// Format note (e.g., "1080p", "tiny")
    pub format_note: Option<String>,
}

/// Format record in ytdl's vocabulary (itag + mime + quality label)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RustyYtdlFormat {
    pub itag: u64,
    /// Container from the mime type (mp4, webm)
    pub container: String,
    /// Coarse quality ("hd720", "medium", "tiny")
    pub quality: Option<String>,
    /// Display label ("1080p60"), absent for audio
    pub quality_label: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub has_video: bool,
    pub has_audio: bool,
    /// Byte length as reported by the player response
    pub content_length: Option<String>,
}

/// Raw format, tagged by the back-end vocabulary it came in
#[derive(Debug, Clone, PartialEq)]
pub enum RawFormat {
    YtDlp(YtDlpFormat),
    RustyYtdl(RustyYtdlFormat),
}

impl RawFormat {
    pub fn backend(&self) -> BackendId {
        match self {
            Self::YtDlp(_) => BackendId::YtDlp,
            Self::RustyYtdl(_) => BackendId::RustyYtdl,
        }
    }
}

/// What an adapter returns before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResolution {
    pub title: Option<String>,
    pub formats: Vec<RawFormat>,
}

/// One extraction back-end.
///
/// Adapters translate only: they invoke the tool and shape its output.
/// Which providers an adapter is tried for is decided by the orchestrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Identity used in plans, logs and `ResolvedMediaFormat::source`
    fn backend(&self) -> BackendId;

    async fn resolve(&self, url: &ValidatedUrl) -> Result<RawResolution, ExtractionError>;
}
