// Common data models for resolution results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::providers::ProviderId;

/// Codec value meaning "track not present".
pub const NO_CODEC: &str = "none";

/// Title used when a back-end does not supply one.
pub const UNTITLED: &str = "Untitled";

/// Identity of an extraction back-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BackendId {
    /// `yt-dlp` binary, general-purpose
    #[serde(rename = "yt-dlp")]
    YtDlp,
    /// `rusty_ytdl` library, YouTube only
    #[serde(rename = "rusty-ytdl")]
    RustyYtdl,
}

impl BackendId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YtDlp => "yt-dlp",
            Self::RustyYtdl => "rusty-ytdl",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yt-dlp" => Ok(Self::YtDlp),
            "rusty-ytdl" => Ok(Self::RustyYtdl),
            other => Err(format!("Unknown backend: {}", other)),
        }
    }
}

/// Which tracks a format carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    VideoAudio,
    VideoOnly,
    AudioOnly,
}

/// One downloadable variant, in the canonical schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMediaFormat {
    pub format_id: String,
    /// Container / file extension (mp4, webm, m4a)
    pub ext: String,
    /// Display resolution, never blank
    pub resolution: String,
    pub quality: Option<String>,
    /// Video codec, `"none"` when there is no video track
    pub vcodec: String,
    /// Audio codec, `"none"` when there is no audio track
    pub acodec: String,
    pub filesize_approx: Option<u64>,
    /// Back-end that produced this format
    pub source: BackendId,
}

impl ResolvedMediaFormat {
    pub fn has_video(&self) -> bool {
        self.vcodec != NO_CODEC
    }

    pub fn has_audio(&self) -> bool {
        self.acodec != NO_CODEC
    }

    /// `None` for the invalid both-`"none"` case.
    pub fn kind(&self) -> Option<FormatKind> {
        match (self.has_video(), self.has_audio()) {
            (true, true) => Some(FormatKind::VideoAudio),
            (true, false) => Some(FormatKind::VideoOnly),
            (false, true) => Some(FormatKind::AudioOnly),
            (false, false) => None,
        }
    }
}

/// Normalized result of one resolution. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMediaInfo {
    pub title: String,
    pub provider: ProviderId,
    /// Normalized URL that was resolved
    pub requested_url: String,
    /// Best format first
    pub formats: Vec<ResolvedMediaFormat>,
    /// Back-end that produced the result
    pub library: BackendId,
}

impl ResolvedMediaInfo {
    /// Default choice for callers: first format in contract order.
    pub fn best_format(&self) -> Option<&ResolvedMediaFormat> {
        self.formats.first()
    }

    pub fn find_format(&self, format_id: &str) -> Option<&ResolvedMediaFormat> {
        self.formats.iter().find(|f| f.format_id == format_id)
    }
}
