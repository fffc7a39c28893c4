use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::types::HttpResponse;

/// The HTTP boundary. The client issues plain GETs and interprets status
/// codes itself, so a transport only reports status and body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// reqwest-backed transport with a fixed per-request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Memoizes successful responses by full request URL.
///
/// Archived captures never change once written, so entries are never
/// invalidated. Failures and non-2xx responses always go to the inner
/// transport.
pub struct CachedTransport<T> {
    inner: T,
    cache: Mutex<HashMap<String, HttpResponse>>,
}

impl<T: Transport> CachedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, url: &str) -> Option<HttpResponse> {
        self.cache.lock().ok()?.get(url).cloned()
    }
}

#[async_trait]
impl<T: Transport> Transport for CachedTransport<T> {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        if let Some(hit) = self.cached(url) {
            debug!(url, "Response cache hit");
            return Ok(hit);
        }

        let resp = self.inner.get(url).await?;
        if resp.is_success() {
            if let Ok(mut cache) = self.cache.lock() {
                cache.insert(url.to_string(), resp.clone());
            }
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeReply, FakeTransport};

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let cached = CachedTransport::new(
            FakeTransport::new().on_path("/cdx", FakeReply::ok("[]")),
        );

        let first = cached.get("http://archive.test/cdx?url=a").await.unwrap();
        let second = cached.get("http://archive.test/cdx?url=a").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner.requests().len(), 1);
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn different_queries_are_cached_separately() {
        let cached = CachedTransport::new(
            FakeTransport::new().on_path("/cdx", FakeReply::ok("[]")),
        );

        cached.get("http://archive.test/cdx?url=a").await.unwrap();
        cached.get("http://archive.test/cdx?url=b").await.unwrap();

        assert_eq!(cached.inner.requests().len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cached = CachedTransport::new(
            FakeTransport::new()
                .on_path("/down", FakeReply::status(503, "busy"))
                .on_path("/broken", FakeReply::error("connection reset")),
        );

        for _ in 0..2 {
            let resp = cached.get("http://archive.test/down").await.unwrap();
            assert_eq!(resp.status, 503);
            assert!(cached.get("http://archive.test/broken").await.is_err());
        }

        assert_eq!(cached.inner.requests().len(), 4);
        assert!(cached.is_empty());
    }
}
