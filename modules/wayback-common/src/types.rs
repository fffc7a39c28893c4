use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base URL for browsing a capture in the Wayback Machine UI.
pub const WAYBACK_WEB_URL: &str = "https://web.archive.org/web";

/// Layout of the 14-digit CDX capture timestamp.
const CDX_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

// --- Index records ---

/// One (URL, capture time) observation from the CDX index.
/// The URL is canonicalized by the client before it lands here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedRecord {
    pub url: String,
    /// `YYYYMMDDHHMMSS`
    pub timestamp: String,
    pub status_code: String,
    pub digest: String,
}

impl ArchivedRecord {
    pub fn new(
        url: impl Into<String>,
        timestamp: impl Into<String>,
        status_code: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            timestamp: timestamp.into(),
            status_code: status_code.into(),
            digest: digest.into(),
        }
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Capture year, read from the timestamp's leading digits.
    pub fn year(&self) -> Option<i32> {
        self.captured_at().map(|dt| dt.year())
    }

    /// Link to this capture in the Wayback Machine UI.
    pub fn replay_url(&self) -> String {
        replay_url(&self.timestamp, &self.url)
    }
}

// --- robots.txt ---

/// One distinct content state of a domain's robots.txt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsVersion {
    pub timestamp: String,
    pub digest: String,
    /// Archived URL, when the index returned it.
    pub original: Option<String>,
    /// Raw archived bytes, filled after snapshot replay.
    pub content: Option<String>,
}

impl RobotsVersion {
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

// --- Derived ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeCount {
    pub url: String,
    pub distinct_digest_count: usize,
}

// --- Helpers ---

/// Parse a CDX timestamp. Shorter timestamps (the index allows trailing
/// precision to be dropped) are padded with the earliest value.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if ts.len() < 4 || ts.len() > 14 || !ts.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut padded = ts.to_string();
    // MMDD default to 0101, hhmmss to 000000
    const FILL: &str = "0101000000";
    padded.push_str(&FILL[ts.len() - 4..]);
    NaiveDateTime::parse_from_str(&padded, CDX_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// `https://web.archive.org/web/<timestamp>/<url>`
pub fn replay_url(timestamp: &str, url: &str) -> String {
    format!("{WAYBACK_WEB_URL}/{timestamp}/{url}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn full_timestamp_parses() {
        let dt = parse_timestamp("20231215143022").unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 12);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.second(), 22);
    }

    #[test]
    fn truncated_timestamp_is_padded() {
        let dt = parse_timestamp("2019").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2019, 1, 1));

        let dt = parse_timestamp("201906").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2019, 6, 1));
    }

    #[test]
    fn garbage_timestamp_is_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("abc").is_none());
        assert!(parse_timestamp("2023121514302299").is_none());
        assert!(parse_timestamp("20231345000000").is_none());
    }

    #[test]
    fn record_year_and_replay_link() {
        let record = ArchivedRecord::new(
            "http://example.com/about",
            "20150102030405",
            "200",
            "ABC",
        );
        assert_eq!(record.year(), Some(2015));
        assert_eq!(
            record.replay_url(),
            "https://web.archive.org/web/20150102030405/http://example.com/about"
        );
    }
}
