//! Activity ranking: which symbols in each category published most recently.
//! Independent read path with no retry and no cache; a failed or empty feed
//! is silently excluded from the ranking, not treated as rank zero.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use futures::future::join_all;
use tracing::debug;

use crate::ingest::gate::FetchGate;
use crate::ingest::rss;
use crate::ingest::types::FeedSource;

/// Category name → (symbol → display name). Read-only configuration input.
pub type CategoryMap = BTreeMap<String, BTreeMap<String, String>>;

/// Ephemeral ranking record; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyActivity {
    pub symbol: String,
    pub company_name: String,
    pub avg_published_at: DateTime<Utc>,
}

/// Items requested per symbol when ranking.
pub const RANK_FEED_COUNT: u32 = 3;

/// Arithmetic mean of the feed's publish instants, or `None` for an empty or
/// unparsable feed.
pub fn mean_published_at(xml: &str) -> Option<DateTime<Utc>> {
    let items = rss::parse_feed(xml).ok()?;
    if items.is_empty() {
        return None;
    }
    let total: i64 = items
        .iter()
        .map(|it| rss::parse_pub_date_unix(&it.pub_date))
        .sum();
    let avg = total / items.len() as i64;
    Utc.timestamp_opt(avg, 0).single()
}

/// Rank one category: fetch each symbol's small feed through the gate (up to
/// the gate's bound in flight at once, no ordering guarantee among them),
/// then sort by mean publish time, newest first.
pub async fn rank_category(
    companies: &BTreeMap<String, String>,
    source: &dyn FeedSource,
    gate: &FetchGate,
) -> Vec<CompanyActivity> {
    let fetches = companies.iter().map(|(symbol, name)| async move {
        let body = gate.admit(source.fetch(symbol, RANK_FEED_COUNT)).await;
        (symbol, name, body)
    });

    let mut ranked = Vec::new();
    for (symbol, name, body) in join_all(fetches).await {
        match body {
            Ok(xml) => match mean_published_at(&xml) {
                Some(avg) => ranked.push(CompanyActivity {
                    symbol: symbol.clone(),
                    company_name: name.clone(),
                    avg_published_at: avg,
                }),
                None => debug!(symbol = %symbol, "empty or unparsable feed, excluded"),
            },
            Err(e) => debug!(symbol = %symbol, error = ?e, "feed fetch failed, excluded"),
        }
    }
    ranked.sort_by(|a, b| b.avg_published_at.cmp(&a.avg_published_at));
    ranked
}

/// Rank every category and keep the top `take` symbols of each.
pub async fn rank_categories(
    map: &CategoryMap,
    source: &dyn FeedSource,
    gate: &FetchGate,
    take: usize,
) -> Vec<(String, Vec<CompanyActivity>)> {
    let mut out = Vec::with_capacity(map.len());
    for (category, companies) in map {
        let mut ranked = rank_category(companies, source, gate).await;
        ranked.truncate(take);
        out.push((category.clone(), ranked));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(ts: &[&str]) -> String {
        let items: String = ts
            .iter()
            .map(|t| format!("<item><title>x</title><pubDate>{t}</pubDate><link>l</link></item>"))
            .collect();
        format!("<rss><channel>{items}</channel></rss>")
    }

    #[test]
    fn mean_of_two_instants_is_their_midpoint() {
        let xml = feed(&[
            "Tue, 02 May 2023 10:00:00 +0000",
            "Tue, 02 May 2023 12:00:00 +0000",
        ]);
        let avg = mean_published_at(&xml).unwrap();
        assert_eq!(avg.format("%H:%M").to_string(), "11:00");
    }

    #[test]
    fn empty_feed_is_excluded() {
        assert!(mean_published_at("<rss><channel></channel></rss>").is_none());
        assert!(mean_published_at("not xml at all").is_none());
    }
}
