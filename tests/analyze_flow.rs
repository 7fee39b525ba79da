// tests/analyze_flow.rs
// Analyze path: curated facts feed the trend call, the raw window is used
// when curation is skipped, and a trend failure aborts the operation.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use stock_news_analyzer::ai_adapter::{AnalysisClient, CompletionRequest};
use stock_news_analyzer::analyze::facts::CurationProvider;
use stock_news_analyzer::analyze::trend::{AnalysisModel, PromptVariant};
use stock_news_analyzer::analyze::{run_analyze, AnalyzeOptions};
use stock_news_analyzer::cache::NewsItem;

/// Routes fact-extraction and trend requests; records the trend input.
struct AnalyzeAi {
    fact_reply: &'static str,
    trend_fails: bool,
    trend_input: Mutex<Option<String>>,
}

#[async_trait]
impl AnalysisClient for AnalyzeAi {
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        if req.system.contains("numbered list of facts") {
            return Ok(self.fact_reply.to_string());
        }
        // anything else is the trend instruction
        if self.trend_fails {
            return Err(anyhow!("service unavailable"));
        }
        *self.trend_input.lock().unwrap() = Some(req.user.clone());
        Ok("Positive 2% over the next 24 hours".to_string())
    }
    fn provider_name(&self) -> &'static str {
        "analyze-fixture"
    }
}

struct DropNothing;

impl CurationProvider for DropNothing {
    fn review(&self, _facts: &[String]) -> Result<Vec<usize>> {
        Ok(vec![])
    }
}

struct DropFirst;

impl CurationProvider for DropFirst {
    fn review(&self, _facts: &[String]) -> Result<Vec<usize>> {
        Ok(vec![1])
    }
}

fn items(n: usize) -> Vec<NewsItem> {
    (0..n)
        .map(|i| NewsItem {
            title: format!("headline {i}"),
            description: "body".to_string(),
            published_at: Utc.timestamp_opt(1_683_000_000 + i as i64 * 60, 0).unwrap(),
            forecast_score: 1,
            key: format!("https://n/{i}"),
            guid: None,
        })
        .collect()
}

fn opts(skip_curation: bool) -> AnalyzeOptions {
    AnalyzeOptions {
        symbol: "TSLA".to_string(),
        model: AnalysisModel::Gpt4oMini,
        variant: PromptVariant::Narrative,
        skip_curation,
    }
}

#[tokio::test]
async fn curated_facts_become_the_trend_input() {
    let ai = AnalyzeAi {
        fact_reply: "1) 2023-05-01T09:00:00Z: Deliveries beat\n2) 2023-05-01T10:00:00Z: Recall announced",
        trend_fails: false,
        trend_input: Mutex::new(None),
    };

    let forecast = run_analyze(&opts(false), &items(3), &ai, &DropFirst)
        .await
        .unwrap();

    assert!(forecast.contains("Positive 2%"));
    let sent = ai.trend_input.lock().unwrap().clone().unwrap();
    assert!(sent.contains("Recall announced"));
    assert!(!sent.contains("Deliveries beat"), "dropped fact must not reach the trend call");
    assert!(!sent.contains("1)"), "prefixes are stripped before the trend call");
}

#[tokio::test]
async fn skipping_curation_sends_the_raw_recent_window() {
    let ai = AnalyzeAi {
        fact_reply: "unused",
        trend_fails: false,
        trend_input: Mutex::new(None),
    };

    // 25 items with the small model: only the 20 most recent survive.
    run_analyze(&opts(true), &items(25), &ai, &DropNothing)
        .await
        .unwrap();

    let sent = ai.trend_input.lock().unwrap().clone().unwrap();
    assert!(sent.contains("headline 24"));
    assert!(sent.contains("headline 5"));
    assert!(!sent.contains("headline 4"), "older items fall out of the window");
}

#[tokio::test]
async fn trend_failure_aborts_the_operation() {
    let ai = AnalyzeAi {
        fact_reply: "1) 2023-05-01: A",
        trend_fails: true,
        trend_input: Mutex::new(None),
    };

    let err = run_analyze(&opts(false), &items(1), &ai, &DropNothing)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("trend analysis call"));
}

#[tokio::test]
async fn empty_cache_is_a_user_visible_error() {
    let ai = AnalyzeAi {
        fact_reply: "unused",
        trend_fails: false,
        trend_input: Mutex::new(None),
    };

    let err = run_analyze(&opts(true), &[], &ai, &DropNothing)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("run export first"));
}
