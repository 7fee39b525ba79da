// src/analyze/mod.rs
//! Analyze path: cached items → dated facts (operator-pruned) → trend
//! forecast.

pub mod ai_adapter;
pub mod facts;
pub mod scorer;
pub mod trend;

use anyhow::{ensure, Result};
use tracing::info;

use crate::analyze::ai_adapter::AnalysisClient;
use crate::analyze::facts::CurationProvider;
use crate::analyze::trend::{AnalysisModel, PromptVariant};
use crate::cache::NewsItem;

pub struct AnalyzeOptions {
    pub symbol: String,
    pub model: AnalysisModel,
    pub variant: PromptVariant,
    pub skip_curation: bool,
}

/// Pick the items fed into fact extraction (or the raw trend call): time
/// order, and for the small model only the most recent ones.
pub fn analysis_window(items: &[NewsItem], model: AnalysisModel) -> Vec<&NewsItem> {
    let mut sorted: Vec<&NewsItem> = items.iter().collect();
    sorted.sort_by_key(|it| it.published_at);
    match model.item_window() {
        Some(n) if sorted.len() > n => sorted.split_off(sorted.len() - n),
        _ => sorted,
    }
}

pub fn items_to_text(items: &[&NewsItem]) -> String {
    items
        .iter()
        .map(|it| {
            format!(
                "{}\t{}\t{}\t{}",
                it.published_at.to_rfc3339(),
                it.title,
                it.description,
                it.forecast_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run the analyze operation over the cached items for one symbol and return
/// the forecast narrative.
pub async fn run_analyze(
    opts: &AnalyzeOptions,
    items: &[NewsItem],
    ai: &dyn AnalysisClient,
    reviewer: &dyn CurationProvider,
) -> Result<String> {
    ensure!(
        !items.is_empty(),
        "no cached news for {}; run export first",
        opts.symbol
    );

    let window = analysis_window(items, opts.model);
    let news_text = items_to_text(&window);

    let input = if opts.skip_curation {
        news_text
    } else {
        let curated = facts::curate_facts(ai, &news_text, reviewer).await?;
        info!(kept = curated.len(), "curation finished");
        curated
            .iter()
            .map(|f| match f.timestamp {
                Some(ts) => format!("{}: {}", ts.to_rfc3339(), f.text),
                None => f.text.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    trend::analyze_trend(ai, &opts.symbol, &input, opts.model, opts.variant).await
}
