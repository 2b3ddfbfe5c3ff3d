// Format normalizer - raw back-end records into the canonical schema
//
// Each back-end vocabulary has its own mapping into a `Candidate`; the
// shared rules (codec sentinels, resolution label, filtering, ordering)
// run on candidates only.
//
// Output order is a contract: video+audio (highest resolution first),
// then video-only, then audio-only.

use regex::Regex;
use std::collections::HashSet;

use super::extractors::{RawFormat, RustyYtdlFormat, YtDlpFormat};
use super::models::{BackendId, FormatKind, ResolvedMediaFormat, NO_CODEC};

pub const AUDIO_ONLY: &str = "audio-only";
pub const VIDEO_ONLY: &str = "video-only";
pub const UNKNOWN: &str = "unknown";

lazy_static::lazy_static! {
    static ref DIMENSIONS_RE: Regex = Regex::new(r"(\d+)\s*x\s*(\d+)").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"\d+").unwrap();
}

/// Back-end neutral intermediate record
#[derive(Debug, Clone, Default, PartialEq)]
struct Candidate {
    format_id: Option<String>,
    ext: Option<String>,
    label: Option<String>,
    quality: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
    filesize: Option<u64>,
}

impl Candidate {
    fn from_ytdlp(f: &YtDlpFormat) -> Self {
        // yt-dlp's "audio only" is a track description, not a resolution
        let label = f
            .resolution
            .clone()
            .filter(|r| !r.eq_ignore_ascii_case("audio only"))
            .or_else(|| f.height.map(|h| format!("{}p", h)));

        Self {
            format_id: f.format_id.clone(),
            ext: f.ext.clone(),
            label,
            quality: f.format_note.clone(),
            vcodec: f.vcodec.clone(),
            acodec: f.acodec.clone(),
            filesize: f.filesize.or(f.filesize_approx),
        }
    }

    fn from_rusty_ytdl(f: &RustyYtdlFormat) -> Self {
        // track flags are authoritative, codec names are optional extras
        let codec = |present: bool, name: &Option<String>| {
            if present {
                Some(name.clone().unwrap_or_else(|| UNKNOWN.to_string()))
            } else {
                Some(NO_CODEC.to_string())
            }
        };

        Self {
            format_id: Some(f.itag.to_string()),
            ext: Some(f.container.clone()).filter(|c| !c.is_empty()),
            label: f.quality_label.clone(),
            quality: f.quality.clone(),
            vcodec: codec(f.has_video, &f.video_codec),
            acodec: codec(f.has_audio, &f.audio_codec),
            filesize: f.content_length.as_deref().and_then(|c| c.trim().parse().ok()),
        }
    }

    fn has_codec_info(&self) -> bool {
        self.vcodec.is_some() || self.acodec.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Resolution label: library label, else derived from which tracks exist.
pub fn resolution_label(label: Option<&str>, vcodec: &str, acodec: &str) -> String {
    if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
        return label.to_string();
    }
    match (vcodec != NO_CODEC, acodec != NO_CODEC) {
        (false, true) => AUDIO_ONLY.to_string(),
        (true, false) => VIDEO_ONLY.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Numeric height in a label: `1920x1080` -> 1080, `720p60` -> 720.
pub fn resolution_height(label: &str) -> Option<u32> {
    if let Some(caps) = DIMENSIONS_RE.captures(label) {
        return caps.get(2)?.as_str().parse().ok();
    }
    NUMBER_RE.find(label)?.as_str().parse().ok()
}

fn finish(index: usize, source: BackendId, candidate: Candidate) -> Option<ResolvedMediaFormat> {
    let has_codec_info = candidate.has_codec_info();
    let format_id = non_blank(candidate.format_id);

    if format_id.is_none() && !has_codec_info {
        return None;
    }

    let vcodec = non_blank(candidate.vcodec).unwrap_or_else(|| NO_CODEC.to_string());
    let acodec = non_blank(candidate.acodec).unwrap_or_else(|| NO_CODEC.to_string());

    if vcodec == NO_CODEC && acodec == NO_CODEC {
        return None;
    }

    let resolution = resolution_label(candidate.label.as_deref(), &vcodec, &acodec);

    Some(ResolvedMediaFormat {
        format_id: format_id.unwrap_or_else(|| format!("{}-{}", source, index)),
        ext: non_blank(candidate.ext).unwrap_or_else(|| UNKNOWN.to_string()),
        resolution,
        quality: non_blank(candidate.quality),
        vcodec,
        acodec,
        filesize_approx: candidate.filesize.filter(|s| *s > 0),
        source,
    })
}

/// Map one raw record into the canonical schema; `None` when it is unusable.
pub fn normalize_one(index: usize, raw: &RawFormat) -> Option<ResolvedMediaFormat> {
    let candidate = match raw {
        RawFormat::YtDlp(f) => Candidate::from_ytdlp(f),
        RawFormat::RustyYtdl(f) => Candidate::from_rusty_ytdl(f),
    };
    finish(index, raw.backend(), candidate)
}

/// Normalize and order a back-end's raw formats. Pure function.
pub fn normalize(raw: &[RawFormat]) -> Vec<ResolvedMediaFormat> {
    let mut seen = HashSet::new();
    let mut muxed = Vec::new();
    let mut video_only = Vec::new();
    let mut audio_only = Vec::new();

    for format in raw
        .iter()
        .enumerate()
        .filter_map(|(i, f)| normalize_one(i, f))
    {
        // format ids must be unique per result; first occurrence wins
        if !seen.insert(format.format_id.clone()) {
            continue;
        }
        match format.kind() {
            Some(FormatKind::VideoAudio) => muxed.push(format),
            Some(FormatKind::VideoOnly) => video_only.push(format),
            Some(FormatKind::AudioOnly) => audio_only.push(format),
            None => {}
        }
    }

    // stable: ties and non-numeric labels keep their input order
    muxed.sort_by_key(|f| std::cmp::Reverse(resolution_height(&f.resolution).map_or(-1, i64::from)));

    muxed.extend(video_only);
    muxed.extend(audio_only);
    muxed
}
