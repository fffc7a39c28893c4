use serde::Serialize;
use serde_json::Value;

use wayback_common::ArchivedRecord;

use crate::error::{CdxError, Result};

/// Fields requested for domain-wide URL harvesting, in row order.
pub const HARVEST_FIELDS: &str = "original,timestamp,statuscode,digest";

/// Fields requested for robots.txt history, in row order.
pub const ROBOTS_FIELDS: &str = "timestamp,statuscode,digest,original";

// --- Queries ---

/// Query-string builder for the CDX search endpoint.
#[derive(Debug, Clone, Default)]
pub struct CdxQuery {
    params: Vec<(&'static str, String)>,
}

impl CdxQuery {
    /// JSON output for the given URL pattern and field list.
    pub fn new(url_pattern: impl Into<String>, fields: &str) -> Self {
        Self::default()
            .param("url", url_pattern)
            .param("output", "json")
            .param("fl", fields)
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Full request URL against `base`, query-encoded.
    pub fn build(&self, base: &str) -> Result<String> {
        url::Url::parse_with_params(base, &self.params)
            .map(String::from)
            .map_err(|e| CdxError::Endpoint(format!("{base}: {e}")))
    }
}

/// Every capture under a domain (`<domain>/*`), paged.
pub fn harvest_query(domain: &str, page_size: u32) -> CdxQuery {
    CdxQuery::new(format!("{domain}/*"), HARVEST_FIELDS).param("pageSize", page_size.to_string())
}

/// Distinct successful captures of a domain's robots.txt.
pub fn robots_query(domain: &str) -> CdxQuery {
    CdxQuery::new(format!("{domain}/robots.txt"), ROBOTS_FIELDS)
        .param("filter", "statuscode:200")
        .param("collapse", "digest")
        .param("sort", "timestamp")
}

// --- Responses ---

/// Minimal view of an HTTP response: status and decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Interpret a `showNumPages=true` response.
///
/// The live index answers with a bare integer. An array is also accepted,
/// in which case every row after the header counts as one page.
pub fn parse_page_count(body: &str) -> Result<u32> {
    let value: Value = serde_json::from_str(body.trim())?;
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| CdxError::IndexMalformed(format!("invalid page count: {n}"))),
        Value::Array(rows) => Ok(rows.len().saturating_sub(1) as u32),
        other => Err(CdxError::IndexMalformed(format!(
            "expected page count or array, got {}",
            json_kind(&other)
        ))),
    }
}

/// Data rows of a JSON CDX response, header row removed.
/// An empty body means no captures.
pub fn parse_rows(body: &str) -> Result<Vec<Vec<String>>> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<Vec<Value>> = serde_json::from_str(trimmed)?;
    Ok(rows
        .into_iter()
        .skip(1)
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Build a record from an `original,timestamp,statuscode,digest` row.
/// The URL is canonicalized here so everything downstream compares clean URLs.
pub fn record_from_row(row: &[String]) -> Option<ArchivedRecord> {
    match row {
        [original, timestamp, status, digest, ..] => Some(ArchivedRecord::new(
            wayback_common::canonicalize(original),
            timestamp.as_str(),
            status.as_str(),
            digest.as_str(),
        )),
        _ => None,
    }
}

/// One row of robots.txt history as returned by the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotsCapture {
    pub timestamp: String,
    pub status_code: String,
    pub digest: String,
    pub original: Option<String>,
}

impl RobotsCapture {
    /// Rows carry 3 fields, or 4 when the index includes the original URL.
    pub fn from_row(row: &[String]) -> Option<Self> {
        match row {
            [timestamp, status, digest] => Some(Self {
                timestamp: timestamp.clone(),
                status_code: status.clone(),
                digest: digest.clone(),
                original: None,
            }),
            [timestamp, status, digest, original] => Some(Self {
                timestamp: timestamp.clone(),
                status_code: status.clone(),
                digest: digest.clone(),
                original: Some(original.clone()),
            }),
            _ => None,
        }
    }
}

// --- Harvest output ---

/// A page that was abandoned after exhausting its attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub page: u32,
    pub attempts: u32,
    pub reason: String,
}

/// Everything retrieved for a domain, plus which pages were lost.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Harvest {
    pub domain: String,
    pub pages_total: u32,
    pub records: Vec<ArchivedRecord>,
    pub failed_pages: Vec<PageFailure>,
}

impl Harvest {
    pub fn empty(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// True when every page contributed its records.
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }
}
