use super::types::{FeedDocument, Manifest};
use crate::error::LoopMirrorError;
use reqwest::header::CONTENT_LENGTH;
use serde::de::DeserializeOwned;
use url::Url;

pub const USER_AGENT: &str = concat!("loopmirror/", env!("CARGO_PKG_VERSION"));

/// Every year's content lives under `<content root><prefix><year>/`.
pub const CONTENT_DIR_PREFIX: &str = "lp10_ms3_content_";

/// HTTP access to the manifest, the feed documents and the content packages.
#[derive(Clone, Debug)]
pub struct FeedClient {
    http: reqwest::Client,
    manifest_url: Url,
    content_root: Url,
}

impl FeedClient {
    pub fn new(manifest_url: Url, content_root: Url) -> Result<Self, LoopMirrorError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LoopMirrorError::fetch(content_root.as_str(), e))?;
        Ok(Self {
            http,
            manifest_url,
            content_root: with_trailing_slash(content_root),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn content_root(&self) -> &Url {
        &self.content_root
    }

    /// URL of a file inside a year's content directory.
    pub fn year_url(&self, year: &str, file_name: &str) -> String {
        format!(
            "{}{CONTENT_DIR_PREFIX}{year}/{file_name}",
            self.content_root
        )
    }

    /// URL of a path relative to the content root itself.
    pub fn root_url(&self, relative: &str) -> String {
        format!("{}{}", self.content_root, relative.trim_start_matches('/'))
    }

    pub async fn fetch_manifest(&self) -> Result<Manifest, LoopMirrorError> {
        tracing::info!(url = %self.manifest_url, "Fetching manifest");
        self.fetch_plist(self.manifest_url.as_str()).await
    }

    pub async fn fetch_feed(
        &self,
        year: &str,
        feed_name: &str,
    ) -> Result<FeedDocument, LoopMirrorError> {
        let url = self.year_url(year, feed_name);
        tracing::info!(%url, "Fetching feed document");
        self.fetch_plist(&url).await
    }

    /// Asks the server for the size of a content package without fetching it.
    pub async fn probe_size(&self, url: &str) -> Result<u64, LoopMirrorError> {
        let size_probe_error = |reason: String| LoopMirrorError::SizeProbe {
            url: url.to_string(),
            reason,
        };

        let response = self
            .http
            .head(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| size_probe_error(e.to_string()))?;

        // The body of a HEAD response is empty, so the header has to be read
        // directly rather than through `Response::content_length`.
        let header = response
            .headers()
            .get(CONTENT_LENGTH)
            .ok_or_else(|| size_probe_error("no Content-Length header".to_string()))?;
        header
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or_else(|| size_probe_error(format!("invalid Content-Length {header:?}")))
    }

    async fn fetch_plist<T: DeserializeOwned>(&self, url: &str) -> Result<T, LoopMirrorError> {
        let body = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| LoopMirrorError::fetch(url, e))?
            .bytes()
            .await
            .map_err(|e| LoopMirrorError::fetch(url, e))?;

        plist::from_bytes(&body).map_err(|e| LoopMirrorError::Parse {
            source_name: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
