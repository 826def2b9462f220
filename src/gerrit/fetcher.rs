use super::*;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info};

pub struct ChangeFetcher<T> {
    transport: T,
}

/// One parsed response page.
#[derive(Debug)]
pub struct Page {
    pub changes: Vec<Change>,
    pub stats: QueryStats,
}

impl<T: ReviewTransport> ChangeFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch every change matching `query`, sorted by creation time.
    pub async fn fetch_all(&self, query: &str) -> Result<Vec<Change>> {
        info!("Querying: {}", query);

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(120));

        let mut changes: Vec<Change> = Vec::new();
        loop {
            let start = changes.len();
            pb.set_message(format!("Fetching changes from offset {}", start));

            let output = self.transport.query(query, start).await?;
            let page = parse_page(&output)
                .with_context(|| format!("Malformed gerrit query output at offset {}", start))?;
            let fetched = page.changes.len();
            changes.extend(page.changes);

            if changes.is_empty() {
                pb.finish_and_clear();
                bail!("No patches found!");
            }

            info!(
                "Found metadata for {} more patches, {} total so far",
                fetched,
                changes.len()
            );

            if !page.stats.more_changes {
                break;
            }
            if fetched == 0 {
                pb.finish_and_clear();
                bail!("Gerrit reported more changes but returned an empty page at offset {}", start);
            }
        }

        pb.finish_with_message(format!("Fetched {} changes", changes.len()));

        changes.sort_by_key(|change| change.created_on);
        Ok(changes)
    }
}

/// Split a `--format=json` response into change records and the trailing
/// stats line.
pub fn parse_page(output: &str) -> Result<Page> {
    let mut changes = Vec::new();
    let mut stats = None;

    for (index, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("Line {} is not valid JSON", index + 1))?;

        if value.get("type").and_then(|t| t.as_str()) == Some("stats") {
            stats = Some(serde_json::from_value(value)?);
            continue;
        }

        let change: Change = serde_json::from_value(value)
            .with_context(|| format!("Line {} is not a change record", index + 1))?;
        debug!(
            "{} {}",
            change.url.as_deref().unwrap_or("-"),
            change.subject.as_deref().unwrap_or("")
        );
        changes.push(change);
    }

    match stats {
        Some(stats) => Ok(Page { changes, stats }),
        None => bail!("Missing stats line"),
    }
}
