// yt-dlp extractor - runs the native `yt-dlp` binary with --dump-json
//
// General-purpose back-end, supports every registered provider.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Command as StdCommand;
use tracing::{debug, warn};

use super::traits::{ExtractorConfig, MediaExtractor, RawFormat, RawResolution, YtDlpFormat};
use crate::resolver::errors::ExtractionError;
use crate::resolver::models::BackendId;
use crate::resolver::providers::ProviderId;
use crate::resolver::utils::{proxy_args, run_output_with_timeout};
use crate::resolver::validator::ValidatedUrl;

/// Subprocess back-end using the yt-dlp binary
pub struct YtDlpExtractor {
    ytdlp_path: String,
    config: ExtractorConfig,
}

impl YtDlpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let ytdlp_path = config
            .ytdlp_path
            .clone()
            .unwrap_or_else(Self::find_ytdlp);
        debug!(path = %ytdlp_path, "using yt-dlp binary");
        Self { ytdlp_path, config }
    }

    pub fn binary_path(&self) -> &str {
        &self.ytdlp_path
    }

    /// Find yt-dlp binary
    fn find_ytdlp() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
            "/usr/bin/yt-dlp",
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Build command arguments
    fn build_args(&self, url: &ValidatedUrl) -> Vec<String> {
        let config = &self.config;
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            config.timeout_seconds.to_string(),
            "--retries".to_string(),
            "2".to_string(),
        ];

        if url.provider_id() == ProviderId::Youtube {
            if let Some(client) = &config.player_client {
                args.push("--extractor-args".to_string());
                args.push(format!("youtube:player_client={}", client));
            }
        }

        if let Some(path) = &config.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.clone());
        } else if config.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push("chrome".to_string());
        }

        args.extend(proxy_args(config.proxy.as_deref()));

        // end of options, so a URL can never be read as a flag
        args.push("--".to_string());
        args.push(url.as_str().to_string());
        args
    }

    /// Parse `--dump-json` output
    pub(crate) fn parse_json(stdout: &[u8]) -> Result<RawResolution, ExtractionError> {
        let json: Value = serde_json::from_slice(stdout)?;

        let title = json["title"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let formats = match json["formats"].as_array() {
            Some(array) => array.iter().map(Self::parse_format).collect(),
            // single-format extractors put the format fields at top level
            None if json["format_id"].is_string() => vec![Self::parse_format(&json)],
            None => {
                return Err(ExtractionError::ParseError(
                    "No formats array in JSON".to_string(),
                ))
            }
        };

        Ok(RawResolution {
            title,
            formats: formats.into_iter().map(RawFormat::YtDlp).collect(),
        })
    }

    fn parse_format(f: &Value) -> YtDlpFormat {
        let string = |key: &str| {
            f[key]
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        // yt-dlp reports some sizes as floats
        let bytes = |key: &str| f[key].as_u64().or_else(|| f[key].as_f64().map(|v| v as u64));

        YtDlpFormat {
            format_id: string("format_id"),
            ext: string("ext"),
            resolution: string("resolution"),
            width: f["width"].as_u64().and_then(|w| u32::try_from(w).ok()),
            height: f["height"].as_u64().and_then(|h| u32::try_from(h).ok()),
            vcodec: string("vcodec"),
            acodec: string("acodec"),
            filesize: bytes("filesize"),
            filesize_approx: bytes("filesize_approx"),
            format_note: string("format_note"),
        }
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn backend(&self) -> BackendId {
        BackendId::YtDlp
    }

    async fn resolve(&self, url: &ValidatedUrl) -> Result<RawResolution, ExtractionError> {
        let args = self.build_args(url);
        debug!(
            backend = %self.backend(),
            "running: {} {}",
            self.ytdlp_path,
            args.join(" ")
        );

        let output = run_output_with_timeout(
            &self.ytdlp_path,
            args,
            u64::from(self.config.timeout_seconds),
        )
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(backend = %self.backend(), status = ?output.status.code(), "yt-dlp failed: {}", stderr);
            let message = if stderr.is_empty() {
                format!("yt-dlp exited with {:?}", output.status.code())
            } else {
                stderr
            };
            return Err(ExtractionError::from(message));
        }

        Self::parse_json(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::validator::validate_media_url;

    const DUMP: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "title": "Never Gonna Give You Up",
        "formats": [
            {"format_id": "140", "ext": "m4a", "resolution": "audio only",
             "vcodec": "none", "acodec": "mp4a.40.2", "filesize": 3433514},
            {"format_id": "137", "ext": "mp4", "width": 1920, "height": 1080,
             "resolution": "1920x1080", "vcodec": "avc1.640028", "acodec": "none",
             "filesize_approx": 80123456.7, "format_note": "1080p"},
            {"format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none"}
        ]
    }"#;

    fn extractor() -> YtDlpExtractor {
        YtDlpExtractor::new(ExtractorConfig::default().with_ytdlp_path(Some("yt-dlp".into())))
    }

    #[test]
    fn test_parse_dump_json() {
        let raw = YtDlpExtractor::parse_json(DUMP.as_bytes()).unwrap();
        assert_eq!(raw.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(raw.formats.len(), 3);

        let RawFormat::YtDlp(video) = &raw.formats[1] else {
            panic!("expected yt-dlp vocabulary");
        };
        assert_eq!(video.format_id.as_deref(), Some("137"));
        assert_eq!(video.height, Some(1080));
        assert_eq!(video.filesize_approx, Some(80123456));
        assert_eq!(video.format_note.as_deref(), Some("1080p"));
    }

    #[test]
    fn test_parse_single_format_dump() {
        let raw = YtDlpExtractor::parse_json(
            br#"{"title": "clip", "format_id": "hls-720", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a"}"#,
        )
        .unwrap();
        assert_eq!(raw.formats.len(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            YtDlpExtractor::parse_json(b"not json"),
            Err(ExtractionError::ParseError(_))
        ));
        assert!(matches!(
            YtDlpExtractor::parse_json(br#"{"title": "x"}"#),
            Err(ExtractionError::ParseError(_))
        ));
    }

    #[test]
    fn test_oversized_dimensions_are_dropped() {
        let raw = YtDlpExtractor::parse_json(
            br#"{"formats": [{"format_id": "x", "width": 4294967296, "height": 1080,
                 "vcodec": "avc1", "acodec": "none"}]}"#,
        )
        .unwrap();
        let RawFormat::YtDlp(f) = &raw.formats[0] else {
            panic!("expected yt-dlp vocabulary");
        };
        assert_eq!(f.width, None);
        assert_eq!(f.height, Some(1080));
    }

    #[test]
    fn test_blank_title_is_absent() {
        let raw = YtDlpExtractor::parse_json(br#"{"title": "  ", "formats": []}"#).unwrap();
        assert!(raw.title.is_none());
    }

    #[test]
    fn test_build_args() {
        let url = validate_media_url("https://vimeo.com/76979871").unwrap();
        let ex = YtDlpExtractor::new(
            ExtractorConfig::default()
                .with_ytdlp_path(Some("yt-dlp".into()))
                .with_proxy(Some("socks5h://127.0.0.1:1080".into()))
                .with_player_client(Some("android".into())),
        );
        let args = ex.build_args(&url);
        assert!(args.contains(&"--dump-json".to_string()));
        assert!(args.contains(&"--proxy".to_string()));
        // player client applies to youtube only
        assert!(!args.iter().any(|a| a.starts_with("youtube:")));
        assert_eq!(args.last().map(String::as_str), Some("https://vimeo.com/76979871"));
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_youtube_player_client() {
        let url = validate_media_url("youtu.be/dQw4w9WgXcQ").unwrap();
        let ex = YtDlpExtractor::new(
            ExtractorConfig::default()
                .with_ytdlp_path(Some("yt-dlp".into()))
                .with_player_client(Some("web".into())),
        );
        assert!(ex
            .build_args(&url)
            .contains(&"youtube:player_client=web".to_string()));
        assert_eq!(extractor().backend(), BackendId::YtDlp);
    }
}
