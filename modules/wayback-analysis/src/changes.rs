use std::collections::{HashMap, HashSet};

use wayback_common::{canonicalize, ArchivedRecord, ChangeCount};

/// Most recent captures shown in a single URL's history.
pub const HISTORY_LIMIT: usize = 50;

/// Distinct content digests per canonical URL, busiest first. Ties keep
/// the order in which URLs first appear.
pub fn change_counts(records: &[ArchivedRecord]) -> Vec<ChangeCount> {
    let mut order: Vec<String> = Vec::new();
    let mut digests: HashMap<String, HashSet<&str>> = HashMap::new();

    for record in records {
        let url = canonicalize(&record.url);
        let seen = digests.entry(url.clone()).or_insert_with(|| {
            order.push(url);
            HashSet::new()
        });
        seen.insert(record.digest.as_str());
    }

    let mut counts: Vec<ChangeCount> = order
        .into_iter()
        .map(|url| {
            let distinct_digest_count = digests.get(&url).map_or(0, HashSet::len);
            ChangeCount {
                url,
                distinct_digest_count,
            }
        })
        .collect();
    counts.sort_by(|a, b| b.distinct_digest_count.cmp(&a.distinct_digest_count));
    counts
}

pub fn top_changing(records: &[ArchivedRecord], n: usize) -> Vec<ChangeCount> {
    let mut counts = change_counts(records);
    counts.truncate(n);
    counts
}

/// Captures of one URL, newest first, at most `limit` of them.
pub fn change_history<'a>(
    records: &'a [ArchivedRecord],
    url: &str,
    limit: usize,
) -> Vec<&'a ArchivedRecord> {
    let target = canonicalize(url);
    let mut history: Vec<&ArchivedRecord> = records
        .iter()
        .filter(|r| canonicalize(&r.url) == target)
        .collect();
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    history.truncate(limit);
    history
}
