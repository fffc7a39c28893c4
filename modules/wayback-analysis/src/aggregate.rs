use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;
use wayback_common::{top_folder, ArchivedRecord};

/// Column that absorbs every folder past the top N.
pub const OTHER_COLUMN: &str = "Other";

pub const DEFAULT_TOP_FOLDERS: usize = 10;

/// Year-by-key count table. Rows ascend by year and every row carries one
/// count per entry in `keys`, in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountTable {
    pub keys: Vec<String>,
    pub rows: Vec<YearRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearRow {
    pub year: i32,
    pub counts: Vec<u64>,
}

impl CountTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }

    pub fn count(&self, year: i32, key: &str) -> u64 {
        let Some(col) = self.keys.iter().position(|k| k == key) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|r| r.year == year)
            .map_or(0, |r| r.counts[col])
    }

    /// Sum of one column across all years.
    pub fn total(&self, key: &str) -> u64 {
        match self.keys.iter().position(|k| k == key) {
            Some(col) => self.rows.iter().map(|r| r.counts[col]).sum(),
            None => 0,
        }
    }
}

// --- Status classes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatusClass {
    Informational,
    Success,
    Redirect,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusClass {
    pub const ALL: [StatusClass; 6] = [
        StatusClass::Informational,
        StatusClass::Success,
        StatusClass::Redirect,
        StatusClass::ClientError,
        StatusClass::ServerError,
        StatusClass::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusClass::Informational => "1xx",
            StatusClass::Success => "2xx",
            StatusClass::Redirect => "3xx",
            StatusClass::ClientError => "4xx",
            StatusClass::ServerError => "5xx",
            StatusClass::Unknown => "Unknown",
        }
    }

    fn column(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket an HTTP status code string. Anything that is not an integer
/// (the index reports `-` for some captures) is `Unknown`.
pub fn status_class(code: &str) -> StatusClass {
    match code.trim().parse::<i64>() {
        Ok(c) if c < 200 => StatusClass::Informational,
        Ok(c) if c < 300 => StatusClass::Success,
        Ok(c) if c < 400 => StatusClass::Redirect,
        Ok(c) if c < 500 => StatusClass::ClientError,
        Ok(_) => StatusClass::ServerError,
        Err(_) => StatusClass::Unknown,
    }
}

// --- Tables ---

/// Captures per year per top-level folder. The `top_n` busiest folders
/// get their own column; the rest are summed into `Other`.
pub fn folder_table(records: &[ArchivedRecord], top_n: usize) -> CountTable {
    let mut folders: Vec<String> = Vec::new();
    let mut folder_index: HashMap<String, usize> = HashMap::new();
    let mut per_year: BTreeMap<i32, HashMap<usize, u64>> = BTreeMap::new();

    for record in records {
        let Some(year) = record.year() else {
            debug!(timestamp = record.timestamp.as_str(), "Skipping record without a year");
            continue;
        };
        let folder = top_folder(&record.url);
        let idx = *folder_index.entry(folder.clone()).or_insert_with(|| {
            folders.push(folder);
            folders.len() - 1
        });
        *per_year.entry(year).or_default().entry(idx).or_default() += 1;
    }

    let mut totals = vec![0u64; folders.len()];
    for counts in per_year.values() {
        for (&idx, &n) in counts {
            totals[idx] += n;
        }
    }

    // Stable sort keeps first-seen order among equal totals
    let mut ranked: Vec<usize> = (0..folders.len()).collect();
    ranked.sort_by(|&a, &b| totals[b].cmp(&totals[a]));
    let top: Vec<usize> = ranked.into_iter().take(top_n).collect();

    let mut keys: Vec<String> = top.iter().map(|&i| folders[i].clone()).collect();
    keys.push(OTHER_COLUMN.to_string());

    let rows = per_year
        .into_iter()
        .map(|(year, counts)| {
            let mut row: Vec<u64> = top
                .iter()
                .map(|idx| counts.get(idx).copied().unwrap_or(0))
                .collect();
            let other: u64 = counts
                .iter()
                .filter(|(idx, _)| !top.contains(idx))
                .map(|(_, n)| n)
                .sum();
            row.push(other);
            YearRow { year, counts: row }
        })
        .collect();

    CountTable { keys, rows }
}

/// Captures per year per status class, always with all six columns.
pub fn status_table(records: &[ArchivedRecord]) -> CountTable {
    let mut per_year: BTreeMap<i32, Vec<u64>> = BTreeMap::new();

    for record in records {
        let Some(year) = record.year() else {
            debug!(timestamp = record.timestamp.as_str(), "Skipping record without a year");
            continue;
        };
        let class = status_class(&record.status_code);
        per_year
            .entry(year)
            .or_insert_with(|| vec![0; StatusClass::ALL.len()])[class.column()] += 1;
    }

    CountTable {
        keys: StatusClass::ALL
            .iter()
            .map(|c| c.label().to_string())
            .collect(),
        rows: per_year
            .into_iter()
            .map(|(year, counts)| YearRow { year, counts })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(url: &str, ts: &str, status: &str) -> ArchivedRecord {
        ArchivedRecord::new(url, ts, status, "D")
    }

    #[test]
    fn status_codes_bucket_into_classes() {
        let classes: Vec<StatusClass> = ["150", "200", "301", "404", "503", "abc"]
            .into_iter()
            .map(status_class)
            .collect();
        assert_eq!(classes, StatusClass::ALL.to_vec());
    }

    #[test]
    fn status_class_edges() {
        assert_eq!(status_class("199"), StatusClass::Informational);
        assert_eq!(status_class("299"), StatusClass::Success);
        assert_eq!(status_class("399"), StatusClass::Redirect);
        assert_eq!(status_class("499"), StatusClass::ClientError);
        assert_eq!(status_class("999"), StatusClass::ServerError);
        assert_eq!(status_class("-"), StatusClass::Unknown);
        assert_eq!(status_class(""), StatusClass::Unknown);
    }

    #[test]
    fn status_table_has_fixed_columns_and_sorted_years() {
        let records = vec![
            rec("http://a.com/", "20120101000000", "200"),
            rec("http://a.com/x", "20100101000000", "404"),
            rec("http://a.com/y", "20120505000000", "-"),
            rec("http://a.com/z", "20120606000000", "200"),
        ];
        let table = status_table(&records);

        assert_eq!(table.keys, vec!["1xx", "2xx", "3xx", "4xx", "5xx", "Unknown"]);
        assert_eq!(table.years(), vec![2010, 2012]);
        assert_eq!(table.count(2010, "4xx"), 1);
        assert_eq!(table.count(2012, "2xx"), 2);
        assert_eq!(table.count(2012, "Unknown"), 1);
        assert_eq!(table.count(2012, "5xx"), 0);
    }

    #[test]
    fn folder_table_groups_by_first_segment() {
        let records = vec![
            rec("http://a.com/", "20100101000000", "200"),
            rec("http://a.com/blog/1", "20100101000000", "200"),
            rec("http://a.com/blog/2", "20110101000000", "200"),
            rec("http://a.com/about", "20110101000000", "200"),
        ];
        let table = folder_table(&records, DEFAULT_TOP_FOLDERS);

        assert_eq!(table.keys, vec!["/blog/", "Root", "/about/", "Other"]);
        assert_eq!(table.count(2010, "/blog/"), 1);
        assert_eq!(table.count(2010, "Root"), 1);
        assert_eq!(table.count(2011, "/about/"), 1);
        assert_eq!(table.total("Other"), 0);
    }

    #[test]
    fn folders_past_top_n_fold_into_other() {
        let records = vec![
            rec("http://a.com/a/1", "20100101000000", "200"),
            rec("http://a.com/a/2", "20100101000000", "200"),
            rec("http://a.com/a/3", "20100101000000", "200"),
            rec("http://a.com/b/1", "20100101000000", "200"),
            rec("http://a.com/b/2", "20110101000000", "200"),
            rec("http://a.com/c/1", "20110101000000", "200"),
            rec("http://a.com/d/1", "20110101000000", "200"),
        ];
        let table = folder_table(&records, 2);

        assert_eq!(table.keys, vec!["/a/", "/b/", "Other"]);
        assert_eq!(table.count(2010, "Other"), 0);
        assert_eq!(table.count(2011, "Other"), 2);
        assert_eq!(table.total("/a/"), 3);
        assert_eq!(table.total("/b/"), 2);
    }

    #[test]
    fn records_without_a_year_are_skipped() {
        let records = vec![
            rec("http://a.com/", "garbage", "200"),
            rec("http://a.com/", "20100101000000", "200"),
        ];
        assert_eq!(status_table(&records).total("2xx"), 1);
        assert_eq!(folder_table(&records, 10).total("Root"), 1);
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        let folders = folder_table(&[], 10);
        assert!(folders.is_empty());
        assert_eq!(folders.keys, vec!["Other"]);
        assert!(status_table(&[]).is_empty());
    }
}
