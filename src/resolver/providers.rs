// Provider registry - static platform table
//
// Each provider owns an ordered list of patterns matched against
// `hostname + path`. Registry order is fixed and the first match wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported content platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Youtube,
    Vimeo,
    Dailymotion,
    Tiktok,
    Instagram,
    Facebook,
    Twitter,
    Reddit,
    Twitch,
    Soundcloud,
    Bilibili,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Vimeo => "vimeo",
            Self::Dailymotion => "dailymotion",
            Self::Tiktok => "tiktok",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Reddit => "reddit",
            Self::Twitch => "twitch",
            Self::Soundcloud => "soundcloud",
            Self::Bilibili => "bilibili",
        }
    }

    /// Human-readable name for UI
    pub fn label(&self) -> &'static str {
        find_provider(*self).map_or("Unknown", |p| p.label)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_providers()
            .iter()
            .map(|p| p.id)
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown provider: {}", s))
    }
}

/// A platform entry in the registry
#[derive(Debug)]
pub struct MediaProvider {
    pub id: ProviderId,
    pub label: &'static str,
    patterns: Vec<Regex>,
}

impl MediaProvider {
    fn new(id: ProviderId, label: &'static str, patterns: &[&str]) -> Self {
        Self {
            id,
            label,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("provider pattern must compile"))
                .collect(),
        }
    }

    /// Test `hostname + path` against this provider's patterns.
    pub fn matches(&self, target: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(target))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|re| re.as_str())
    }
}

lazy_static::lazy_static! {
    static ref REGISTRY: Vec<MediaProvider> = vec![
        MediaProvider::new(ProviderId::Youtube, "YouTube", &[
            r"^(www\.|m\.|music\.)?youtube\.com/(watch|shorts/|live/|embed/|playlist|v/)",
            r"^youtu\.be/[\w-]+",
            r"^(www\.)?youtube-nocookie\.com/embed/",
        ]),
        MediaProvider::new(ProviderId::Vimeo, "Vimeo", &[
            r"^(www\.|player\.)?vimeo\.com/(video/)?\d+",
        ]),
        MediaProvider::new(ProviderId::Dailymotion, "Dailymotion", &[
            r"^(www\.)?dailymotion\.com/video/",
            r"^dai\.ly/",
        ]),
        MediaProvider::new(ProviderId::Tiktok, "TikTok", &[
            r"^(www\.|m\.)?tiktok\.com/@[^/]+/video/\d+",
            r"^(vm|vt)\.tiktok\.com/",
        ]),
        MediaProvider::new(ProviderId::Instagram, "Instagram", &[
            r"^(www\.)?instagram\.com/(p|reel|reels|tv)/",
        ]),
        MediaProvider::new(ProviderId::Facebook, "Facebook", &[
            r"^(www\.|m\.|web\.)?facebook\.com/(watch|reel/|[^/]+/videos/)",
            r"^fb\.watch/",
        ]),
        MediaProvider::new(ProviderId::Twitter, "X (Twitter)", &[
            r"^(www\.|mobile\.)?(twitter|x)\.com/[^/]+/status/\d+",
        ]),
        MediaProvider::new(ProviderId::Reddit, "Reddit", &[
            r"^(www\.|old\.)?reddit\.com/r/[^/]+/comments/",
            r"^v\.redd\.it/",
        ]),
        MediaProvider::new(ProviderId::Twitch, "Twitch", &[
            r"^(www\.|m\.)?twitch\.tv/(videos/\d+|[^/]+/clip/)",
            r"^clips\.twitch\.tv/",
        ]),
        MediaProvider::new(ProviderId::Soundcloud, "SoundCloud", &[
            r"^(www\.|m\.)?soundcloud\.com/[^/]+/[^/]+",
        ]),
        MediaProvider::new(ProviderId::Bilibili, "Bilibili", &[
            r"^(www\.|m\.)?bilibili\.com/video/",
            r"^b23\.tv/",
        ]),
    ];
}

/// All providers in registry order
pub fn all_providers() -> &'static [MediaProvider] {
    &REGISTRY
}

pub fn find_provider(id: ProviderId) -> Option<&'static MediaProvider> {
    REGISTRY.iter().find(|p| p.id == id)
}

/// Detect the provider for a host and path. Host is expected lowercase.
pub fn detect_provider(host: &str, path: &str) -> Option<&'static MediaProvider> {
    let target = format!("{}{}", host, path);
    REGISTRY.iter().find(|p| p.matches(&target))
}
