pub mod error;
pub mod pacing;
pub mod progress;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{CdxError, Result};
pub use pacing::{PacingPolicy, Sleeper, TokioSleeper};
pub use progress::{NoProgress, ProgressSink};
pub use transport::{CachedTransport, HttpTransport, Transport};
pub use types::{CdxQuery, Harvest, HttpResponse, PageFailure, RobotsCapture};

use std::sync::Arc;

use tracing::{debug, info, warn};
use wayback_common::{normalize_domain, ArchivedRecord, Config};

use types::{harvest_query, parse_page_count, parse_rows, record_from_row, robots_query};

/// Client for the Wayback Machine CDX index and snapshot replay.
///
/// Pages are fetched strictly one after another, with pauses taken from
/// the `PacingPolicy`.
pub struct CdxClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    cdx_url: String,
    replay_url: String,
    page_size: u32,
    pacing: PacingPolicy,
}

impl CdxClient {
    /// Live client: reqwest behind a response cache, real sleeps.
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpTransport::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_parts(
            config,
            Arc::new(CachedTransport::new(http)),
            Arc::new(TokioSleeper),
        ))
    }

    pub fn with_parts(
        config: &Config,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            transport,
            sleeper,
            cdx_url: config.cdx_url.clone(),
            replay_url: config.replay_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            pacing: PacingPolicy::from_config(config),
        }
    }

    pub fn pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Ask the index how many pages of captures exist under a domain.
    pub async fn page_count(&self, domain: &str) -> Result<u32> {
        let domain = normalize_domain(domain);
        let url = harvest_query(&domain, self.page_size)
            .param("showNumPages", "true")
            .build(&self.cdx_url)?;

        let resp = self.transport.get(&url).await?;
        if !resp.is_success() {
            return Err(CdxError::IndexUnavailable {
                status: resp.status,
            });
        }
        parse_page_count(&resp.body)
    }

    /// Retrieve every capture under a domain.
    ///
    /// Discovery failures abort. A page that still fails after
    /// `max_attempts` is skipped and listed in `Harvest::failed_pages`.
    pub async fn harvest(&self, domain: &str, progress: &dyn ProgressSink) -> Result<Harvest> {
        let domain = normalize_domain(domain);
        let pages = self.page_count(&domain).await?;

        if pages == 0 {
            warn!(domain = domain.as_str(), "No pages found for domain");
            return Ok(Harvest::empty(domain));
        }

        info!(domain = domain.as_str(), pages, "Harvesting archived URLs");
        progress.begin(pages);

        let mut harvest = Harvest {
            domain: domain.clone(),
            pages_total: pages,
            ..Harvest::default()
        };

        for page in 0..pages {
            let mut attempt = 0;
            loop {
                attempt += 1;
                match self.fetch_page(&domain, page).await {
                    Ok(records) => {
                        debug!(page, count = records.len(), "Fetched index page");
                        harvest.records.extend(records);
                        self.sleeper.sleep(self.pacing.page_delay).await;
                        break;
                    }
                    Err(e) => {
                        warn!(page, attempt, error = %e, "Error fetching index page");
                        self.sleeper.sleep(self.pacing.failure_backoff).await;
                        if attempt >= self.pacing.max_attempts {
                            harvest.failed_pages.push(PageFailure {
                                page,
                                attempts: attempt,
                                reason: e.to_string(),
                            });
                            break;
                        }
                    }
                }
            }
            progress.page_done(page + 1, pages);
        }
        progress.finish();

        info!(
            domain = domain.as_str(),
            records = harvest.records.len(),
            failed_pages = harvest.failed_pages.len(),
            "Harvest complete"
        );
        Ok(harvest)
    }

    async fn fetch_page(&self, domain: &str, page: u32) -> Result<Vec<ArchivedRecord>> {
        let url = harvest_query(domain, self.page_size)
            .param("page", page.to_string())
            .build(&self.cdx_url)?;

        let resp = self.transport.get(&url).await?;
        if !resp.is_success() {
            return Err(CdxError::IndexUnavailable {
                status: resp.status,
            });
        }

        let mut records = Vec::new();
        for row in parse_rows(&resp.body)? {
            match record_from_row(&row) {
                Some(record) => records.push(record),
                None => warn!(page, fields = row.len(), "Skipping short index row"),
            }
        }
        Ok(records)
    }

    /// robots.txt captures with status 200, one per digest where the index
    /// collapses them, in the order the index returns them.
    pub async fn robots_captures(&self, domain: &str) -> Result<Vec<RobotsCapture>> {
        let domain = normalize_domain(domain);
        let url = robots_query(&domain).build(&self.cdx_url)?;

        let resp = self.transport.get(&url).await?;
        if !resp.is_success() {
            return Err(CdxError::IndexUnavailable {
                status: resp.status,
            });
        }

        let mut captures = Vec::new();
        for row in parse_rows(&resp.body)? {
            match RobotsCapture::from_row(&row) {
                Some(capture) => captures.push(capture),
                None => warn!(fields = row.len(), "Skipping malformed robots.txt row"),
            }
        }
        debug!(domain = domain.as_str(), count = captures.len(), "Fetched robots.txt history");
        Ok(captures)
    }

    /// Raw archived bytes of `target` as captured at `timestamp`
    /// (`id_` replay mode, no Wayback rewriting). `None` when the snapshot
    /// cannot be retrieved.
    pub async fn snapshot(&self, timestamp: &str, target: &str) -> Option<String> {
        let url = format!("{}/{}id_/{}", self.replay_url, timestamp, target);
        match self.transport.get(&url).await {
            Ok(resp) if resp.is_success() => Some(resp.body),
            Ok(resp) => {
                warn!(timestamp, target, status = resp.status, "Snapshot unavailable");
                None
            }
            Err(e) => {
                warn!(timestamp, target, error = %e, "Snapshot fetch failed");
                None
            }
        }
    }
}
