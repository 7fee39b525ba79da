//! stock-news-analyzer — CLI entrypoint.
//! Three mutually exclusive operations: `export` (fetch + score + cache +
//! sheet), `rank` (most recently active symbols per category), `analyze`
//! (curated short-term forecast from cached news).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stock_news_analyzer::analyze::facts::TerminalCuration;
use stock_news_analyzer::analyze::trend::{AnalysisModel, PromptVariant};
use stock_news_analyzer::analyze::{self, AnalyzeOptions};
use stock_news_analyzer::cache::{self, CacheStore, JsonFileCache};
use stock_news_analyzer::config;
use stock_news_analyzer::ingest::gate::FetchGate;
use stock_news_analyzer::ingest::http::HttpFeedSource;
use stock_news_analyzer::ingest::types::FeedSource;
use stock_news_analyzer::pipeline::{self, ExportOptions};
use stock_news_analyzer::rank;
use stock_news_analyzer::ai_adapter::{AnalysisClient, OpenAiProvider};
use stock_news_analyzer::retry::RetryPolicy;

#[derive(Parser, Debug)]
#[command(name = "stock-news-analyzer")]
#[command(version)]
#[command(about = "Fetch, score and analyze stock news feeds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch news for a symbol, score it and export the tab-separated sheet
    Export {
        /// Stock symbol, e.g. TSLA
        #[arg(short, long)]
        symbol: String,

        /// Maximum number of news items to request per source
        #[arg(short, long, default_value_t = 100)]
        count: u32,

        /// Minimum delay between gated fetches, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Analysis model used for scoring and summarization
        #[arg(short, long, value_enum, default_value = "gpt-4o-mini")]
        model: AnalysisModel,

        /// Give up on a unit after this many attempts (default: retry forever)
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Output directory for the sheet and the cache
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },

    /// Rank the most recently active symbols per category
    Rank {
        /// Concurrent feed fetches
        #[arg(long, default_value_t = 3)]
        concurrency: usize,

        /// Minimum delay between gated fetches, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },

    /// Produce a curated short-term forecast from cached news
    Analyze {
        /// Stock symbol, e.g. TSLA
        #[arg(short, long)]
        symbol: String,

        /// Analysis model for fact extraction and the trend call
        #[arg(short, long, value_enum, default_value = "gpt-4o-mini")]
        model: AnalysisModel,

        /// Forecast prompt template
        #[arg(short = 'p', long, value_enum, default_value = "narrative")]
        prompt_variant: PromptVariant,

        /// Skip interactive fact curation and analyze the raw recent window
        #[arg(long)]
        no_curation: bool,

        /// Directory holding the per-symbol cache
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere. Carries OPENAI_API_KEY.
    let _ = dotenvy::dotenv();
    init_tracing();

    match Cli::parse().command {
        Commands::Export {
            symbol,
            count,
            delay_ms,
            model,
            max_attempts,
            out_dir,
        } => run_export_cmd(symbol, count, delay_ms, model, max_attempts, out_dir).await,
        Commands::Rank {
            concurrency,
            delay_ms,
        } => run_rank_cmd(concurrency, delay_ms).await,
        Commands::Analyze {
            symbol,
            model,
            prompt_variant,
            no_curation,
            out_dir,
        } => run_analyze_cmd(symbol, model, prompt_variant, no_curation, out_dir).await,
    }
}

async fn run_export_cmd(
    symbol: String,
    count: u32,
    delay_ms: u64,
    model: AnalysisModel,
    max_attempts: Option<u32>,
    out_dir: PathBuf,
) -> Result<()> {
    let templates = config::load_feed_templates_default()?;
    let sources: Vec<Box<dyn FeedSource>> = templates
        .into_iter()
        .map(|t| Box::new(HttpFeedSource::new(t)) as Box<dyn FeedSource>)
        .collect();
    let gate = FetchGate::new(3, Duration::from_millis(delay_ms));
    let ai = OpenAiProvider::new(model.api_name());
    let mut cache = JsonFileCache::open(&out_dir, &symbol)?;
    info!(
        provider = ai.provider_name(),
        cache = %cache.path().display(),
        "starting export"
    );

    let opts = ExportOptions {
        symbol: symbol.clone(),
        count,
        retry: RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        },
    };

    let merged = pipeline::run_export(&opts, &sources, &gate, &mut cache, &ai).await?;
    info!(new_or_merged = merged.len(), cached = cache.items().len(), "export pass finished");

    let path = cache::write_export(&out_dir, &symbol, cache.items())?;
    println!("The parsed data has been saved to {}", path.display());
    Ok(())
}

async fn run_rank_cmd(concurrency: usize, delay_ms: u64) -> Result<()> {
    let map = config::load_categories_default()?;
    let template = config::load_feed_templates_default()?
        .into_iter()
        .next()
        .unwrap_or_else(|| config::DEFAULT_FEED_TEMPLATE.to_string());
    let source = HttpFeedSource::new(template);
    let gate = FetchGate::new(concurrency, Duration::from_millis(delay_ms));

    for (category, companies) in rank::rank_categories(&map, &source, &gate, 3).await {
        println!("Top {} most active companies in {} by latest news:", companies.len(), category);
        for (i, c) in companies.iter().enumerate() {
            println!(
                "{}. {} ({}) - {}",
                i + 1,
                c.company_name,
                c.symbol,
                c.avg_published_at.to_rfc2822()
            );
        }
        println!();
    }
    Ok(())
}

async fn run_analyze_cmd(
    symbol: String,
    model: AnalysisModel,
    prompt_variant: PromptVariant,
    no_curation: bool,
    out_dir: PathBuf,
) -> Result<()> {
    let cache = JsonFileCache::open(&out_dir, &symbol)?;
    let ai = OpenAiProvider::new(model.api_name());
    info!(
        provider = ai.provider_name(),
        cache = %cache.path().display(),
        "starting analyze"
    );
    let opts = AnalyzeOptions {
        symbol,
        model,
        variant: prompt_variant,
        skip_curation: no_curation,
    };

    match analyze::run_analyze(&opts, cache.items(), &ai, &TerminalCuration).await {
        Ok(forecast) => {
            println!("Analyzed news:\n{forecast}");
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "analyze operation failed");
            Err(e)
        }
    }
}
