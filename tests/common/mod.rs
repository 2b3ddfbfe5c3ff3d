// Shared fixtures: spy back-ends that count calls

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use media_resolver_lib::resolver::extractors::{
    MediaExtractor, RawFormat, RawResolution, RustyYtdlFormat, YtDlpFormat,
};
use media_resolver_lib::resolver::{BackendId, BackendPlan, ExtractionError, ResolutionOrchestrator, ValidatedUrl};

enum Outcome {
    Succeed(RawResolution),
    Fail(ExtractionError),
}

pub struct SpyExtractor {
    backend: BackendId,
    outcome: Outcome,
    calls: AtomicUsize,
}

impl SpyExtractor {
    pub fn succeeding(backend: BackendId, title: &str, formats: Vec<RawFormat>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            outcome: Outcome::Succeed(RawResolution {
                title: Some(title.to_string()),
                formats,
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(backend: BackendId, error: ExtractionError) -> Arc<Self> {
        Arc::new(Self {
            backend,
            outcome: Outcome::Fail(error),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaExtractor for SpyExtractor {
    fn backend(&self) -> BackendId {
        self.backend
    }

    async fn resolve(&self, _url: &ValidatedUrl) -> Result<RawResolution, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Succeed(raw) => Ok(raw.clone()),
            Outcome::Fail(e) => Err(e.clone()),
        }
    }
}

pub fn orchestrator(spies: &[Arc<SpyExtractor>]) -> ResolutionOrchestrator {
    let mut orchestrator = ResolutionOrchestrator::new(BackendPlan::default());
    for spy in spies {
        orchestrator.register(spy.clone());
    }
    orchestrator
}

pub fn ytdlp(id: &str, resolution: &str, vcodec: &str, acodec: &str) -> RawFormat {
    RawFormat::YtDlp(YtDlpFormat {
        format_id: Some(id.to_string()),
        ext: Some("mp4".to_string()),
        resolution: Some(resolution.to_string()),
        vcodec: Some(vcodec.to_string()),
        acodec: Some(acodec.to_string()),
        filesize_approx: Some(1_000_000),
        ..Default::default()
    })
}

pub fn ytdl(itag: u64, label: Option<&str>, has_video: bool, has_audio: bool) -> RawFormat {
    RawFormat::RustyYtdl(RustyYtdlFormat {
        itag,
        container: "mp4".to_string(),
        quality: Some("medium".to_string()),
        quality_label: label.map(str::to_string),
        video_codec: has_video.then(|| "avc1.4d401f".to_string()),
        audio_codec: has_audio.then(|| "mp4a.40.2".to_string()),
        has_video,
        has_audio,
        content_length: Some("2048".to_string()),
    })
}
