use crate::error::{Result, ScanError};
use crate::result::{ReportCategory, ReportLink, ReportOutcome};
use reqwest::Client;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Called before each category is fetched.
pub type FetchProgressCallback = Arc<dyn Fn(ReportCategory, String) + Send + Sync>;

/// Extension used when a report URL's last segment has none.
pub const FALLBACK_EXTENSION: &str = "txt";

pub struct ReportFetcher {
    client: Client,
    progress_callback: Option<FetchProgressCallback>,
}

impl ReportFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(30)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("flusurver/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: FetchProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Downloads every link into `dir`, one category at a time.
    ///
    /// A failed category is recorded and the remaining ones are still
    /// attempted, so the result always has one outcome per link.
    pub async fn fetch_all(
        &self,
        links: &BTreeMap<ReportCategory, ReportLink>,
        dir: &Path,
    ) -> BTreeMap<ReportCategory, ReportOutcome> {
        info!("Fetching {} report(s) into {}", links.len(), dir.display());

        let mut outcomes = BTreeMap::new();
        for (category, link) in links {
            if let Some(ref callback) = self.progress_callback {
                callback(*category, link.url.clone());
            }

            let outcome = match self.fetch_one(link, dir).await {
                Ok(path) => {
                    debug!("Stored {} at {}", category, path.display());
                    ReportOutcome::stored(*category, path)
                }
                Err(e) => {
                    warn!("Failed to fetch {} from {}: {}", category, link.url, e);
                    ReportOutcome::failed(link, e.to_string())
                }
            };
            outcomes.insert(*category, outcome);
        }

        let stored = outcomes.values().filter(|o| o.is_success()).count();
        info!("Fetched {}/{} report(s)", stored, outcomes.len());
        outcomes
    }

    async fn fetch_one(&self, link: &ReportLink, dir: &Path) -> Result<PathBuf> {
        debug!("Fetching {}", link.url);

        let start = Instant::now();
        let response = self.client.get(&link.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Other(format!("HTTP {}", status)));
        }
        let body = response.bytes().await?;
        debug!(
            "Received {} bytes for {} in {:?}",
            body.len(),
            link.category,
            start.elapsed()
        );

        let path = report_path(dir, link.category, &link.url)?;
        tokio::fs::write(&path, &body).await?;
        Ok(path)
    }
}

/// `<dir>/<category>.<ext>` where `ext` comes from the URL's last path segment.
pub fn report_path(dir: &Path, category: ReportCategory, url: &str) -> Result<PathBuf> {
    let ext = url_extension(url)?;
    Ok(dir.join(format!("{}.{}", category, ext)))
}

fn url_extension(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
    let ext = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or(FALLBACK_EXTENSION);
    Ok(ext.to_string())
}
