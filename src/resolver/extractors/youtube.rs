// rusty_ytdl extractor - pure Rust YouTube player-response parser
//
// Secondary back-end: only planned for the youtube provider.

use async_trait::async_trait;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::traits::{ExtractorConfig, MediaExtractor, RawFormat, RawResolution, RustyYtdlFormat};
use crate::resolver::errors::ExtractionError;
use crate::resolver::models::BackendId;
use crate::resolver::validator::ValidatedUrl;

pub struct RustyYtdlExtractor {
    timeout_seconds: u32,
}

impl RustyYtdlExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            timeout_seconds: config.timeout_seconds,
        }
    }

    fn from_library_format(f: &::rusty_ytdl::VideoFormat) -> RustyYtdlFormat {
        RustyYtdlFormat {
            itag: f.itag,
            container: f.mime_type.container.clone(),
            quality: f.quality.clone().filter(|q| !q.is_empty()),
            quality_label: f.quality_label.clone(),
            video_codec: f.mime_type.video_codec.clone(),
            audio_codec: f.mime_type.audio_codec.clone(),
            has_video: f.has_video,
            has_audio: f.has_audio,
            content_length: f.content_length.clone(),
        }
    }
}

impl Default for RustyYtdlExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

#[async_trait]
impl MediaExtractor for RustyYtdlExtractor {
    fn backend(&self) -> BackendId {
        BackendId::RustyYtdl
    }

    async fn resolve(&self, url: &ValidatedUrl) -> Result<RawResolution, ExtractionError> {
        debug!(backend = %self.backend(), url = %url, "fetching player response");

        let video = ::rusty_ytdl::Video::new(url.as_str())
            .map_err(|e| ExtractionError::InvalidUrl(e.to_string()))?;

        let info = timeout(
            Duration::from_secs(u64::from(self.timeout_seconds)),
            video.get_info(),
        )
        .await
        .map_err(|_| ExtractionError::NetworkTimeout)?
        .map_err(|e| ExtractionError::from(e.to_string()))?;

        let title = Some(info.video_details.title.trim().to_string()).filter(|t| !t.is_empty());

        Ok(RawResolution {
            title,
            formats: info
                .formats
                .iter()
                .map(|f| RawFormat::RustyYtdl(Self::from_library_format(f)))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::format_normalizer::normalize;

    fn library_format(json: &str) -> ::rusty_ytdl::VideoFormat {
        serde_json::from_str(json).unwrap()
    }

    const AUDIO: &str = r#"{
        "itag": 140,
        "mimeType": "audio/mp4; codecs=\"mp4a.40.2\"",
        "bitrate": 130000,
        "contentLength": "3433514",
        "quality": "tiny",
        "url": "https://rr1.googlevideo.com/videoplayback?itag=140",
        "hasVideo": false,
        "hasAudio": true,
        "isLive": false,
        "isHLS": false,
        "isDashMPD": false
    }"#;

    const MUXED: &str = r#"{
        "itag": 18,
        "mimeType": "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"",
        "bitrate": 500000,
        "width": 640,
        "height": 360,
        "contentLength": "10234567",
        "quality": "medium",
        "qualityLabel": "360p",
        "url": "https://rr1.googlevideo.com/videoplayback?itag=18",
        "hasVideo": true,
        "hasAudio": true,
        "isLive": false,
        "isHLS": false,
        "isDashMPD": false
    }"#;

    const VIDEO: &str = r#"{
        "itag": 137,
        "mimeType": "video/mp4; codecs=\"avc1.640028\"",
        "bitrate": 4000000,
        "quality": "hd1080",
        "qualityLabel": "1080p",
        "url": "https://rr1.googlevideo.com/videoplayback?itag=137",
        "hasVideo": true,
        "hasAudio": false,
        "isLive": false,
        "isHLS": false,
        "isDashMPD": false
    }"#;

    #[test]
    fn test_library_format_mapping() {
        let audio = RustyYtdlExtractor::from_library_format(&library_format(AUDIO));
        assert_eq!(audio.itag, 140);
        assert_eq!(audio.container, "mp4");
        assert_eq!(audio.quality.as_deref(), Some("tiny"));
        assert_eq!(audio.quality_label, None);
        assert_eq!(audio.video_codec, None);
        assert_eq!(audio.audio_codec.as_deref(), Some("mp4a.40.2"));
        assert!(!audio.has_video && audio.has_audio);

        let muxed = RustyYtdlExtractor::from_library_format(&library_format(MUXED));
        assert_eq!(muxed.video_codec.as_deref(), Some("avc1.42001E"));
        assert_eq!(muxed.audio_codec.as_deref(), Some("mp4a.40.2"));
        assert_eq!(muxed.content_length.as_deref(), Some("10234567"));
    }

    #[test]
    fn test_library_formats_normalize_in_group_order() {
        let raw: Vec<_> = [AUDIO, VIDEO, MUXED]
            .iter()
            .map(|json| RawFormat::RustyYtdl(RustyYtdlExtractor::from_library_format(&library_format(json))))
            .collect();

        let out = normalize(&raw);
        let ids: Vec<_> = out.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["18", "137", "140"]);

        assert_eq!(out[0].resolution, "360p");
        assert_eq!(out[0].quality.as_deref(), Some("medium"));
        assert_eq!(out[0].filesize_approx, Some(10234567));

        assert_eq!(out[1].acodec, "none");
        assert_eq!(out[1].vcodec, "avc1.640028");
        assert_eq!(out[1].filesize_approx, None);

        assert_eq!(out[2].vcodec, "none");
        assert_eq!(out[2].acodec, "mp4a.40.2");
        assert_eq!(out[2].resolution, "audio-only");
        assert_eq!(out[2].quality.as_deref(), Some("tiny"));
        assert_eq!(out[2].filesize_approx, Some(3433514));
        assert!(out.iter().all(|f| f.source == BackendId::RustyYtdl));
    }

    #[test]
    fn test_backend_id() {
        assert_eq!(RustyYtdlExtractor::default().backend(), BackendId::RustyYtdl);
    }
}
