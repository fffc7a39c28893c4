use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use cdx_client::{CdxClient, Harvest};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use wayback_analysis::{
    change_history, compare, export_file_name, find_version, folder_table, robots_history,
    select, status_table, timeline, top_changing, write_csv, ExportFilter, HISTORY_LIMIT,
};

use crate::progress::HarvestProgress;
use crate::render;

pub struct Ctx {
    pub client: CdxClient,
    pub json: bool,
    pub quiet: bool,
}

impl Ctx {
    /// JSON when `--json` was given, the rendered text otherwise.
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    async fn fetch_captures(&self, domain: &str) -> Result<Harvest> {
        let progress = HarvestProgress::new(self.quiet);
        let harvest = self
            .client
            .harvest(domain, &progress)
            .await
            .with_context(|| format!("Failed to harvest captures for {domain}"))?;

        if !harvest.is_complete() {
            warn!(
                domain = harvest.domain.as_str(),
                failed_pages = harvest.failed_pages.len(),
                "Results are partial"
            );
        }
        Ok(harvest)
    }
}

pub async fn harvest(ctx: &Ctx, domain: &str) -> Result<()> {
    let harvest = ctx.fetch_captures(domain).await?;
    ctx.emit(&harvest, || render::harvest_summary(&harvest))
}

pub async fn folders(ctx: &Ctx, domain: &str, top: usize) -> Result<()> {
    let harvest = ctx.fetch_captures(domain).await?;
    let table = folder_table(&harvest.records, top);
    ctx.emit(&table, || render::count_table(&table))
}

pub async fn status(ctx: &Ctx, domain: &str) -> Result<()> {
    let harvest = ctx.fetch_captures(domain).await?;
    let table = status_table(&harvest.records);
    ctx.emit(&table, || render::count_table(&table))
}

pub async fn changes(ctx: &Ctx, domain: &str, top: usize, url: Option<&str>) -> Result<()> {
    let harvest = ctx.fetch_captures(domain).await?;
    let ranking = top_changing(&harvest.records, top);
    let history = url.map(|u| change_history(&harvest.records, u, HISTORY_LIMIT));

    let value = json!({ "top": ranking, "history": history });
    ctx.emit(&value, || {
        let mut text = render::change_ranking(&ranking);
        if let (Some(u), Some(records)) = (url, &history) {
            text.push('\n');
            text.push_str(&render::history(u, records));
        }
        text
    })
}

pub async fn robots(ctx: &Ctx, domain: &str) -> Result<()> {
    let versions = robots_history(&ctx.client, domain)
        .await
        .with_context(|| format!("Failed to load robots.txt history for {domain}"))?;
    let entries = timeline(&versions);
    ctx.emit(&entries, || render::robots_timeline(domain, &entries))
}

pub async fn robots_diff(ctx: &Ctx, domain: &str, from: &str, to: &str) -> Result<()> {
    let versions = robots_history(&ctx.client, domain)
        .await
        .with_context(|| format!("Failed to load robots.txt history for {domain}"))?;
    let missing = |ts: &str| anyhow!("No robots.txt version captured at {ts}; run `robots {domain}` to list them");
    let older = find_version(&versions, from).ok_or_else(|| missing(from))?;
    let newer = find_version(&versions, to).ok_or_else(|| missing(to))?;

    let comparison = compare(&ctx.client, domain, older, newer).await;
    let spans = comparison.diff()?;

    let value = json!({
        "domain": comparison.domain,
        "from": older.timestamp,
        "to": newer.timestamp,
        "spans": spans,
    });
    ctx.emit(&value, || {
        format!(
            "--- robots.txt @ {}\n+++ robots.txt @ {}\n{}",
            older.timestamp,
            newer.timestamp,
            render::diff(&spans)
        )
    })
}

pub async fn export(
    ctx: &Ctx,
    domain: &str,
    filter: ExportFilter,
    unique: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let harvest = ctx.fetch_captures(domain).await?;
    let selected = select(&harvest.records, filter, unique);
    let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(domain)));

    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let rows = write_csv(BufWriter::new(file), selected)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), rows, "Export written");

    let value = json!({ "path": path, "rows": rows });
    ctx.emit(&value, || format!("Wrote {rows} row(s) to {}\n", path.display()))
}
