// Test doubles for the three injection points of `CdxClient`:
// - FakeTransport (Transport): route table of canned replies, request log
// - RecordingSleeper (Sleeper): records requested pauses, never waits
// - RecordingProgress (ProgressSink): records page completions

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CdxError, Result};
use crate::pacing::Sleeper;
use crate::progress::ProgressSink;
use crate::transport::Transport;
use crate::types::HttpResponse;

// ---------------------------------------------------------------------------
// FakeTransport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FakeReply {
    Response(HttpResponse),
    Error(String),
}

impl FakeReply {
    pub fn ok(body: impl Into<String>) -> Self {
        FakeReply::Response(HttpResponse::new(200, body))
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        FakeReply::Response(HttpResponse::new(status, body))
    }

    pub fn error(message: impl Into<String>) -> Self {
        FakeReply::Error(message.into())
    }
}

struct Route {
    path_contains: Option<String>,
    query: Vec<(String, String)>,
    /// Replies are consumed in order; the last one repeats.
    replies: Mutex<VecDeque<FakeReply>>,
}

impl Route {
    fn matches(&self, url: &url::Url) -> bool {
        if let Some(fragment) = &self.path_contains {
            if !url.path().contains(fragment.as_str()) {
                return false;
            }
        }
        self.query.iter().all(|(k, v)| {
            url.query_pairs()
                .any(|(qk, qv)| qk == k.as_str() && qv == v.as_str())
        })
    }

    fn next_reply(&self) -> Option<FakeReply> {
        let mut replies = self.replies.lock().ok()?;
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

/// Route-table transport. The first route whose path fragment and query
/// pairs all match answers the request; unmatched requests get a 404.
pub struct FakeTransport {
    routes: Vec<Route>,
    requests: Mutex<Vec<String>>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests carrying all of `pairs` in their query string.
    pub fn on_query(self, pairs: &[(&str, &str)], reply: FakeReply) -> Self {
        self.on_query_sequence(pairs, vec![reply])
    }

    /// Like `on_query`, replying with each entry in turn (last one repeats).
    pub fn on_query_sequence(mut self, pairs: &[(&str, &str)], replies: Vec<FakeReply>) -> Self {
        self.routes.push(Route {
            path_contains: None,
            query: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            replies: Mutex::new(replies.into()),
        });
        self
    }

    /// Answer requests whose path contains `fragment`.
    pub fn on_path(mut self, fragment: &str, reply: FakeReply) -> Self {
        self.routes.push(Route {
            path_contains: Some(fragment.to_string()),
            query: Vec::new(),
            replies: Mutex::new(VecDeque::from([reply])),
        });
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// How many requests carried all of `pairs`.
    pub fn count_with_query(&self, pairs: &[(&str, &str)]) -> usize {
        self.requests()
            .iter()
            .filter_map(|raw| url::Url::parse(raw).ok())
            .filter(|url| {
                pairs.iter().all(|(k, v)| {
                    url.query_pairs().any(|(qk, qv)| qk == *k && qv == *v)
                })
            })
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, raw: &str) -> Result<HttpResponse> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(raw.to_string());
        }

        let url = url::Url::parse(raw).map_err(|e| CdxError::Network(e.to_string()))?;
        let reply = self
            .routes
            .iter()
            .find(|route| route.matches(&url))
            .and_then(Route::next_reply);

        match reply {
            Some(FakeReply::Response(resp)) => Ok(resp),
            Some(FakeReply::Error(message)) => Err(CdxError::Network(message)),
            None => Ok(HttpResponse::new(404, "not found")),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingSleeper
// ---------------------------------------------------------------------------

/// Fake clock: remembers every pause and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.sleeps().into_iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingProgress
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingProgress {
    begun: Mutex<Option<u32>>,
    done: Mutex<Vec<(u32, u32)>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> Option<u32> {
        self.begun.lock().ok().and_then(|b| *b)
    }

    /// `(completed, total)` pairs in the order they were reported.
    pub fn updates(&self) -> Vec<(u32, u32)> {
        self.done.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn begin(&self, total_pages: u32) {
        if let Ok(mut begun) = self.begun.lock() {
            *begun = Some(total_pages);
        }
    }

    fn page_done(&self, completed: u32, total: u32) {
        if let Ok(mut done) = self.done.lock() {
            done.push((completed, total));
        }
    }
}
