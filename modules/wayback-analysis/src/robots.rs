use std::collections::HashSet;

use cdx_client::{CdxClient, RobotsCapture};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use wayback_common::{normalize_domain, RobotsVersion};

use crate::diff::{semantic_diff, DiffSpan};
use crate::error::{AnalysisError, Result};

const UNAVAILABLE: &str = "Unable to fetch one or both versions of robots.txt";

/// One version per content digest (first capture wins), oldest first.
pub fn dedupe_versions(captures: &[RobotsCapture]) -> Vec<RobotsVersion> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut versions: Vec<RobotsVersion> = captures
        .iter()
        .filter(|&c| seen.insert(c.digest.as_str()))
        .map(|c| RobotsVersion {
            timestamp: c.timestamp.clone(),
            digest: c.digest.clone(),
            original: c.original.clone(),
            content: None,
        })
        .collect();
    versions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    versions
}

/// Distinct robots.txt versions archived for a domain.
pub async fn robots_history(client: &CdxClient, domain: &str) -> Result<Vec<RobotsVersion>> {
    let captures = client.robots_captures(domain).await?;
    let versions = dedupe_versions(&captures);
    info!(
        domain,
        captures = captures.len(),
        versions = versions.len(),
        "Loaded robots.txt history"
    );
    Ok(versions)
}

/// Archived robots.txt body at `timestamp`, or `None` if the snapshot
/// can't be retrieved.
pub async fn robots_content(client: &CdxClient, domain: &str, timestamp: &str) -> Option<String> {
    let target = format!("{}/robots.txt", normalize_domain(domain));
    client.snapshot(timestamp, &target).await
}

/// Two versions of a domain's robots.txt with whatever content could be
/// fetched for each.
#[derive(Debug, Clone, Serialize)]
pub struct RobotsComparison {
    pub domain: String,
    pub older: RobotsVersion,
    pub newer: RobotsVersion,
}

impl RobotsComparison {
    pub fn is_available(&self) -> bool {
        self.older.content.is_some() && self.newer.content.is_some()
    }

    /// Semantic diff from the older to the newer content.
    pub fn diff(&self) -> Result<Vec<DiffSpan>> {
        match (&self.older.content, &self.newer.content) {
            (Some(old), Some(new)) => Ok(semantic_diff(old, new)),
            _ => Err(AnalysisError::ContentUnavailable(UNAVAILABLE.to_string())),
        }
    }
}

/// Fetch the content of both versions. Missing snapshots are logged and
/// left as `None`; `RobotsComparison::diff` reports them.
pub async fn compare(
    client: &CdxClient,
    domain: &str,
    older: &RobotsVersion,
    newer: &RobotsVersion,
) -> RobotsComparison {
    let mut older = older.clone();
    let mut newer = newer.clone();
    older.content = robots_content(client, domain, &older.timestamp).await;
    newer.content = robots_content(client, domain, &newer.timestamp).await;

    if older.content.is_none() || newer.content.is_none() {
        warn!(
            domain,
            older = older.timestamp.as_str(),
            newer = newer.timestamp.as_str(),
            "robots.txt snapshot missing"
        );
    }

    RobotsComparison {
        domain: normalize_domain(domain),
        older,
        newer,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub at: DateTime<Utc>,
    pub timestamp: String,
    pub digest: String,
}

/// Dated points for a change timeline. Versions with unreadable
/// timestamps are left out.
pub fn timeline(versions: &[RobotsVersion]) -> Vec<TimelineEntry> {
    versions
        .iter()
        .filter_map(|v| {
            v.captured_at().map(|at| TimelineEntry {
                at,
                timestamp: v.timestamp.clone(),
                digest: v.digest.clone(),
            })
        })
        .collect()
}

pub fn find_version<'a>(versions: &'a [RobotsVersion], timestamp: &str) -> Option<&'a RobotsVersion> {
    versions.iter().find(|v| v.timestamp == timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn capture(ts: &str, digest: &str) -> RobotsCapture {
        RobotsCapture {
            timestamp: ts.to_string(),
            status_code: "200".to_string(),
            digest: digest.to_string(),
            original: None,
        }
    }

    fn version(ts: &str, content: Option<&str>) -> RobotsVersion {
        RobotsVersion {
            timestamp: ts.to_string(),
            digest: format!("D{ts}"),
            original: None,
            content: content.map(String::from),
        }
    }

    #[test]
    fn repeated_digest_keeps_first_capture() {
        let versions = dedupe_versions(&[
            capture("20100101000000", "dig1"),
            capture("20110101000000", "dig1"),
            capture("20120101000000", "dig2"),
        ]);

        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].timestamp, "20100101000000");
        assert_eq!(versions[0].digest, "dig1");
        assert_eq!(versions[1].digest, "dig2");
    }

    #[test]
    fn versions_are_sorted_oldest_first() {
        let versions = dedupe_versions(&[
            capture("20150101000000", "b"),
            capture("20120101000000", "a"),
            capture("20180101000000", "a"),
        ]);
        let stamps: Vec<&str> = versions.iter().map(|v| v.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["20120101000000", "20150101000000"]);
    }

    #[test]
    fn diff_needs_both_contents() {
        let comparison = RobotsComparison {
            domain: "example.com".into(),
            older: version("1", Some("User-agent: *\n")),
            newer: version("2", None),
        };
        assert!(!comparison.is_available());
        match comparison.diff() {
            Err(AnalysisError::ContentUnavailable(msg)) => {
                assert_eq!(msg, "Unable to fetch one or both versions of robots.txt")
            }
            other => panic!("expected ContentUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn timeline_skips_unreadable_timestamps() {
        let versions = vec![version("20100315000000", None), version("bogus", None)];
        let points = timeline(&versions);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].at.year(), 2010);
        assert_eq!(points[0].at.month(), 3);
    }

    #[test]
    fn find_version_by_timestamp() {
        let versions = vec![version("1", None), version("2", None)];
        assert_eq!(find_version(&versions, "2").map(|v| v.digest.as_str()), Some("D2"));
        assert!(find_version(&versions, "3").is_none());
    }
}
