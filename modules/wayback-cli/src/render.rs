//! Plain-text rendering of analysis results for the terminal.

use cdx_client::Harvest;
use wayback_analysis::robots::TimelineEntry;
use wayback_analysis::{CountTable, DiffOp, DiffSpan};
use wayback_common::{ArchivedRecord, ChangeCount};

pub fn harvest_summary(harvest: &Harvest) -> String {
    let mut out = format!(
        "{}: {} captures from {} page(s)\n",
        harvest.domain,
        harvest.records.len(),
        harvest.pages_total
    );
    if !harvest.is_complete() {
        out.push_str(&format!(
            "warning: {} page(s) could not be fetched; results are partial\n",
            harvest.failed_pages.len()
        ));
        for failure in &harvest.failed_pages {
            out.push_str(&format!(
                "  page {} after {} attempt(s): {}\n",
                failure.page, failure.attempts, failure.reason
            ));
        }
    }
    out
}

pub fn count_table(table: &CountTable) -> String {
    if table.is_empty() {
        return "No dated captures.\n".to_string();
    }
    let mut header = vec!["Year".to_string()];
    header.extend(table.keys.iter().cloned());
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.year.to_string()];
            cells.extend(row.counts.iter().map(u64::to_string));
            cells
        })
        .collect();
    grid(&header, &rows)
}

pub fn change_ranking(counts: &[ChangeCount]) -> String {
    if counts.is_empty() {
        return "No captures.\n".to_string();
    }
    let header = vec!["Versions".to_string(), "URL".to_string()];
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|c| vec![c.distinct_digest_count.to_string(), c.url.clone()])
        .collect();
    grid(&header, &rows)
}

pub fn history(url: &str, records: &[&ArchivedRecord]) -> String {
    if records.is_empty() {
        return format!("No captures of {url}.\n");
    }
    let header = ["Timestamp", "Status", "Digest", "View"].map(String::from).to_vec();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.timestamp.clone(),
                r.status_code.clone(),
                r.digest.clone(),
                r.replay_url(),
            ]
        })
        .collect();
    format!("History of {url}\n{}", grid(&header, &rows))
}

pub fn robots_timeline(domain: &str, entries: &[TimelineEntry]) -> String {
    if entries.is_empty() {
        return format!("No archived robots.txt for {domain}.\n");
    }
    let header = ["Captured", "Timestamp", "Digest"].map(String::from).to_vec();
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.at.format("%Y-%m-%d %H:%M:%S").to_string(),
                e.timestamp.clone(),
                e.digest.clone(),
            ]
        })
        .collect();
    format!("{} distinct robots.txt version(s)\n{}", entries.len(), grid(&header, &rows))
}

/// Inline word-diff markup: `[-removed-]` and `{+added+}`.
pub fn diff(spans: &[DiffSpan]) -> String {
    if spans.iter().all(|s| s.op == DiffOp::Equal) {
        return "No differences.\n".to_string();
    }
    let mut out = String::new();
    for span in spans {
        match span.op {
            DiffOp::Equal => out.push_str(&span.text),
            DiffOp::Delete => {
                out.push_str("[-");
                out.push_str(&span.text);
                out.push_str("-]");
            }
            DiffOp::Insert => {
                out.push_str("{+");
                out.push_str(&span.text);
                out.push_str("+}");
            }
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Left-aligned columns padded to the widest cell, two spaces apart.
fn grid(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(header);
    for row in rows {
        out.push_str(&line(row));
    }
    out
}
