// tests/rank_activity.rs
// Activity ranking: recency ordering by mean publish instant, silent
// exclusion of failed and empty feeds, top-N cut per category.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stock_news_analyzer::ingest::gate::FetchGate;
use stock_news_analyzer::ingest::types::FeedSource;
use stock_news_analyzer::rank::{rank_categories, rank_category, CategoryMap};

/// Serves a canned feed per symbol; unknown symbols fail like a dead host.
struct PerSymbolSource {
    feeds: BTreeMap<&'static str, String>,
}

#[async_trait]
impl FeedSource for PerSymbolSource {
    async fn fetch(&self, symbol: &str, _count: u32) -> Result<String> {
        self.feeds
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow!("unreachable feed for {symbol}"))
    }
    fn name(&self) -> String {
        "per-symbol fixture".to_string()
    }
}

fn feed(pub_dates: &[&str]) -> String {
    let items: String = pub_dates
        .iter()
        .map(|t| format!("<item><title>t</title><pubDate>{t}</pubDate><link>l</link></item>"))
        .collect();
    format!("<rss><channel>{items}</channel></rss>")
}

fn companies(symbols: &[(&str, &str)]) -> BTreeMap<String, String> {
    symbols
        .iter()
        .map(|(s, n)| (s.to_string(), n.to_string()))
        .collect()
}

#[tokio::test]
async fn fresher_average_activity_ranks_higher() {
    let source = PerSymbolSource {
        feeds: BTreeMap::from([
            ("OLD", feed(&["Mon, 01 May 2023 08:00:00 +0000"])),
            ("NEW", feed(&["Tue, 02 May 2023 08:00:00 +0000"])),
            (
                "MID",
                feed(&[
                    "Mon, 01 May 2023 08:00:00 +0000",
                    "Tue, 02 May 2023 08:00:00 +0000",
                ]),
            ),
        ]),
    };
    let gate = FetchGate::new(3, Duration::ZERO);
    let companies = companies(&[("OLD", "Oldest Co"), ("NEW", "Newest Co"), ("MID", "Middle Co")]);

    let ranked = rank_category(&companies, &source, &gate).await;

    let order: Vec<&str> = ranked.iter().map(|c| c.symbol.as_str()).collect();
    assert_eq!(order, vec!["NEW", "MID", "OLD"]);
    assert_eq!(ranked[0].company_name, "Newest Co");
}

#[tokio::test]
async fn failed_and_empty_feeds_are_excluded_not_ranked_last() {
    let source = PerSymbolSource {
        feeds: BTreeMap::from([
            ("OK", feed(&["Tue, 02 May 2023 08:00:00 +0000"])),
            ("EMPTY", feed(&[])),
            // DEAD intentionally absent: its fetch fails
        ]),
    };
    let gate = FetchGate::new(2, Duration::ZERO);
    let companies = companies(&[("OK", "Ok Co"), ("EMPTY", "Empty Co"), ("DEAD", "Dead Co")]);

    let ranked = rank_category(&companies, &source, &gate).await;

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].symbol, "OK");
}

#[tokio::test]
async fn each_category_reports_at_most_top_three() {
    let mk = |h: u8| {
        let ts = format!("Tue, 02 May 2023 {h:02}:00:00 +0000");
        feed(&[ts.as_str()])
    };
    let source = PerSymbolSource {
        feeds: BTreeMap::from([
            ("A", mk(4)),
            ("B", mk(6)),
            ("C", mk(8)),
            ("D", mk(10)),
        ]),
    };
    let gate = FetchGate::new(3, Duration::ZERO);

    let mut map: CategoryMap = BTreeMap::new();
    map.insert(
        "tech".to_string(),
        companies(&[("A", "A Co"), ("B", "B Co"), ("C", "C Co"), ("D", "D Co")]),
    );

    let out = rank_categories(&map, &source, &gate, 3).await;
    assert_eq!(out.len(), 1);
    let (category, ranked) = &out[0];
    assert_eq!(category, "tech");
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].symbol, "D");
    assert_eq!(ranked[2].symbol, "B");
}
