// Download-link builder and JSON response projection
//
// The crate never streams bytes itself; each format gets a locator pointing
// at the streaming endpoint: <base>?url=...&format_id=...&source=...

use serde::Serialize;
use url::Url;

use crate::resolver::{BackendId, ProviderId, ResolvedMediaFormat, ResolvedMediaInfo};

pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "http://127.0.0.1:8080/api/download";

#[derive(Debug, Clone)]
pub struct DownloadLinkBuilder {
    base: Url,
}

impl DownloadLinkBuilder {
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base)?;
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Locator for one format of `url`.
    pub fn build(&self, url: &str, format_id: &str, source: BackendId) -> String {
        let mut link = self.base.clone();
        link.query_pairs_mut()
            .append_pair("url", url)
            .append_pair("format_id", format_id)
            .append_pair("source", source.as_str());
        link.into()
    }

    pub fn for_format(&self, info: &ResolvedMediaInfo, format: &ResolvedMediaFormat) -> String {
        self.build(&info.requested_url, &format.format_id, format.source)
    }

    pub fn project(&self, info: &ResolvedMediaInfo) -> ResolutionResponse {
        ResolutionResponse {
            title: info.title.clone(),
            provider: ProviderView {
                id: info.provider,
                label: info.provider.label(),
            },
            requested_url: info.requested_url.clone(),
            library: info.library,
            formats: info
                .formats
                .iter()
                .map(|f| FormatView {
                    format_id: f.format_id.clone(),
                    ext: f.ext.clone(),
                    resolution: f.resolution.clone(),
                    quality: f.quality.clone(),
                    vcodec: f.vcodec.clone(),
                    acodec: f.acodec.clone(),
                    filesize_approx: f.filesize_approx,
                    source: f.source,
                    download_url: self.for_format(info, f),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResponse {
    pub title: String,
    pub provider: ProviderView,
    pub requested_url: String,
    pub library: BackendId,
    pub formats: Vec<FormatView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderView {
    pub id: ProviderId,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatView {
    pub format_id: String,
    pub ext: String,
    pub resolution: String,
    pub quality: Option<String>,
    pub vcodec: String,
    pub acodec: String,
    pub filesize_approx: Option<u64>,
    pub source: BackendId,
    pub download_url: String,
}
