//! Final short-term trend forecast over curated facts or a raw recent
//! window. Unlike scoring, this call is not retry-wrapped: a failure here
//! aborts the analyze operation.

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::analyze::ai_adapter::{AnalysisClient, CompletionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalysisModel {
    /// Smaller, cheaper model; the analyze input is windowed to recent items.
    #[value(name = "gpt-4o-mini")]
    Gpt4oMini,
    #[value(name = "gpt-4o")]
    Gpt4o,
}

impl AnalysisModel {
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt4o => "gpt-4o",
        }
    }

    /// Output-token budget for the trend call.
    pub fn trend_budget(&self) -> u32 {
        match self {
            Self::Gpt4oMini => 650,
            Self::Gpt4o => 1000,
        }
    }

    /// How many of the most recent items the analyze path keeps; `None`
    /// means no window.
    pub fn item_window(&self) -> Option<usize> {
        match self {
            Self::Gpt4oMini => Some(20),
            Self::Gpt4o => None,
        }
    }
}

/// The three fixed forecast instruction templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromptVariant {
    /// Numbered three-step instruction.
    Steps,
    /// Bulleted expert-trader instruction.
    Bullets,
    /// Single-paragraph narrative instruction.
    Narrative,
}

pub fn trend_instruction(variant: PromptVariant, symbol: &str) -> String {
    match variant {
        PromptVariant::Steps => format!(
            "Act as an experienced trader, analyze the providen last news about \"{symbol}\".\n\
             1) List facts with share price impact (short term): negative, neutral, positive.\n\
             2) Create the detailed analysis of facts above in terms of price change of \"{symbol}\" in short term.\n\
             3) Give your estimate of how much the price of \"{symbol}\" will change in the next 24 hours, specify the estimated growth or drop, e.g: Positive 5%.\n"
        ),
        PromptVariant::Bullets => format!(
            "As an expert trader, analyze the latest news concerning \"{symbol}\":\n\n\
             * Identify and categorize short-term share price impacts based on recent events: negative, neutral, and positive.\n\
             * Provide a comprehensive analysis of the identified events, focusing on their potential effects on the short-term price movement of \"{symbol}\".\n\
             * Offer a prediction for the price change of \"{symbol}\" within the next 24 hours, specifying the estimated percentage of increase or decrease (e.g., Positive 5%)."
        ),
        PromptVariant::Narrative => format!(
            "As a proficient trader, thoroughly examine the most recent updates regarding \"{symbol}\". \
             Begin by assessing and classifying the short-term influences on share price resulting from \
             recent developments as negative, neutral, or positive. Next, conduct an in-depth evaluation \
             of these influences, emphasizing their potential impact on near-term price fluctuations of \
             \"{symbol}\". Finally, present a well-informed forecast for the price variation of \"{symbol}\" \
             over the next 24 hours, specifying the anticipated percentage of growth or decline (e.g., Positive 5%)."
        ),
    }
}

pub async fn analyze_trend(
    ai: &dyn AnalysisClient,
    symbol: &str,
    text: &str,
    model: AnalysisModel,
    variant: PromptVariant,
) -> Result<String> {
    ai.complete(CompletionRequest {
        system: trend_instruction(variant, symbol),
        user: text.to_string(),
        max_tokens: Some(model.trend_budget()),
        temperature: 0.0,
    })
    .await
    .context("trend analysis call")
}
