//! Forecast scoring and summarization. Both operations fail open: any
//! service or parse failure degrades to a neutral result, logged but never
//! surfaced as an error, so the export always makes forward progress.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::analyze::ai_adapter::{AnalysisClient, CompletionRequest};

static SCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(-?\d+)").expect("score regex"));

pub fn score_instruction(symbol: &str) -> String {
    format!(
        "analyze the data provided and give a score from -5 to 5 on how positive \
         the news is in terms of growth in the share price of company called \
         {symbol} output the score only, if NA then 0"
    )
}

/// Extract the first signed integer from a service reply. Replies with no
/// integer, or an out-of-range one, yield exactly 0.
pub fn parse_score(reply: &str) -> i32 {
    let Some(m) = SCORE_RE.find(reply) else {
        warn!(reply, "no integer in score reply, using neutral 0");
        return 0;
    };
    match m.as_str().parse::<i32>() {
        Ok(n) if (-5..=5).contains(&n) => n,
        Ok(n) => {
            warn!(score = n, "score out of range, using neutral 0");
            0
        }
        Err(_) => {
            warn!(reply, "score did not fit an integer, using neutral 0");
            0
        }
    }
}

/// Score one item's text for short-term price impact. Never errors.
pub async fn score_forecast(ai: &dyn AnalysisClient, symbol: &str, text: &str) -> i32 {
    let req = CompletionRequest {
        system: score_instruction(symbol),
        user: text.to_string(),
        max_tokens: Some(25),
        temperature: 0.0,
    };
    match ai.complete(req).await {
        Ok(reply) => parse_score(&reply),
        Err(e) => {
            warn!(error = ?e, "score call failed, using neutral 0");
            0
        }
    }
}

/// Shorten a long description, preserving financial facts. A reply longer
/// than the input is degenerate and is discarded in favor of the original;
/// so is any service failure. Never errors.
pub async fn summarize(ai: &dyn AnalysisClient, text: &str) -> String {
    let req = CompletionRequest {
        system: "Make text shorter, but do not remove important and financial data".to_string(),
        user: text.to_string(),
        max_tokens: None,
        temperature: 0.0,
    };
    match ai.complete(req).await {
        Ok(short) => {
            let from = text.chars().count();
            let to = short.chars().count();
            if to > from {
                warn!(from, to, "shortening failed, returning original text");
                text.to_string()
            } else {
                info!(from, to, "shortened text");
                short
            }
        }
        Err(e) => {
            warn!(error = ?e, "summarize call failed, returning original text");
            text.to_string()
        }
    }
}
