// src/pipeline.rs
//! Export path: each configured source in order, each item through the
//! write-through cache, one at a time; the merged result is time-ordered.

use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::analyze::ai_adapter::AnalysisClient;
use crate::analyze::scorer;
use crate::cache::{CacheStore, NewsItem};
use crate::ingest::gate::FetchGate;
use crate::ingest::rss;
use crate::ingest::types::{FeedItem, FeedSource};
use crate::retry::RetryPolicy;

/// Descriptions longer than this are sent through the summarizer before the
/// record is stored.
pub const SUMMARIZE_THRESHOLD: usize = 500;

pub struct ExportOptions {
    pub symbol: String,
    pub count: u32,
    pub retry: RetryPolicy,
}

/// Process one normalized item against the cache. A hit reuses the stored
/// record verbatim and makes no external calls; a miss scores, optionally
/// summarizes, and writes through before returning. A failed commit leaves
/// the store without the item, so a retried call is a miss again and repeats
/// the durable write.
pub async fn process_item(
    item: &FeedItem,
    symbol: &str,
    cache: &mut dyn CacheStore,
    ai: &dyn AnalysisClient,
) -> Result<NewsItem> {
    if let Some(hit) = cache.get(&item.key) {
        return Ok(hit.clone());
    }

    let score = scorer::score_forecast(
        ai,
        symbol,
        &format!("{}\n{}", item.title, item.description),
    )
    .await;

    let description = if item.description.chars().count() > SUMMARIZE_THRESHOLD {
        scorer::summarize(ai, &item.description).await
    } else {
        item.description.clone()
    };

    let record = NewsItem {
        title: item.title.clone(),
        description,
        published_at: rss::parse_pub_date(&item.pub_date),
        forecast_score: score,
        key: item.key.clone(),
        guid: item.guid.clone(),
    };
    cache.commit(record.clone()).context("committing item")?;
    Ok(record)
}

/// Run the full export. Sources are drained sequentially to keep the
/// write-through cache single-writer; dedup across sources falls out of the
/// cache, since a key already committed takes the hit branch and is never
/// rescored. Returns the deduplicated result list sorted ascending by
/// publication time.
pub async fn run_export(
    opts: &ExportOptions,
    sources: &[Box<dyn FeedSource>],
    gate: &FetchGate,
    cache: &mut dyn CacheStore,
    ai: &dyn AnalysisClient,
) -> Result<Vec<NewsItem>> {
    let mut merged: Vec<NewsItem> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for source in sources {
        let symbol = opts.symbol.as_str();
        let count = opts.count;
        let src = source.as_ref();

        let fetched = crate::retry::with_retry(&opts.retry, "feed fetch", || async move {
            let xml = gate.admit(src.fetch(symbol, count)).await?;
            rss::parse_feed(&xml)
        })
        .await;

        let items = match fetched {
            Ok(items) => items,
            Err(e) => {
                error!(error = ?e, source = %source.name(), "source abandoned after retry budget");
                continue;
            }
        };

        info!(source = %source.name(), items = items.len(), "feed fetched");

        for (i, item) in items.iter().enumerate() {
            info!(item = i + 1, total = items.len(), "processing item");
            let mut state = opts.retry.state();
            let record = loop {
                match process_item(item, symbol, cache, ai).await {
                    Ok(r) => break Some(r),
                    Err(e) => match state.backoff(&opts.retry) {
                        Some(delay) => {
                            warn!(
                                error = ?e,
                                key = %item.key,
                                attempt = state.attempt,
                                delay_ms = delay.as_millis() as u64,
                                "item processing failed, backing off"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            error!(error = ?e, key = %item.key, "item abandoned after retry budget");
                            break None;
                        }
                    },
                }
            };
            if let Some(r) = record {
                if seen.insert(r.key.clone()) {
                    merged.push(r);
                }
            }
        }
    }

    merged.sort_by_key(|r| r.published_at);
    Ok(merged)
}
