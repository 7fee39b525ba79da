//! Fact extraction and operator curation: the service turns accumulated news
//! into a numbered, dated fact list; a curation provider prunes it; the
//! surviving lines are normalized into `Fact`s.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyze::ai_adapter::{AnalysisClient, CompletionRequest};

/// One dated, filtered claim surviving curation. Exists only transiently for
/// one analyze invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub ordinal: u32,
    pub timestamp: Option<DateTime<Utc>>,
    pub text: String,
}

/// Decides which fact ordinals (1-based) to drop. The pipeline stays
/// agnostic to whether the answer comes from a terminal, a file, or a remote
/// approval step.
pub trait CurationProvider {
    fn review(&self, facts: &[String]) -> Result<Vec<usize>>;
}

/// Interactive terminal curation: print the numbered list, block on one line
/// of comma-separated ordinals to remove (empty keeps everything).
pub struct TerminalCuration;

impl CurationProvider for TerminalCuration {
    fn review(&self, facts: &[String]) -> Result<Vec<usize>> {
        println!("Extracted facts:");
        for line in facts {
            println!("{line}");
        }
        println!("Enter comma-separated numbers of facts to remove (empty line keeps all):");
        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("reading curation input")?;
        Ok(parse_drop_set(&input))
    }
}

/// Parse the operator's drop list: 1-based ordinals, tolerant of blanks and
/// junk tokens.
pub fn parse_drop_set(input: &str) -> Vec<usize> {
    input
        .split(',')
        .filter_map(|t| t.trim().parse::<usize>().ok())
        .collect()
}

/// Remove the given 1-based ordinals from `lines`, highest first, so earlier
/// removals do not shift later indices. Out-of-range ordinals are ignored.
pub fn apply_drops(lines: &mut Vec<String>, drops: &[usize]) {
    let mut sorted: Vec<usize> = drops.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    for &ord in sorted.iter().rev() {
        if ord >= 1 && ord <= lines.len() {
            lines.remove(ord - 1);
        }
    }
}

static FACT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\)\s*(.+?):\s+(.*)$").expect("fact prefix regex"));

/// Strip the `"<N>) <ISO-8601 timestamp>: "` prefix from one surviving line.
/// Lines without the expected prefix are kept whole.
pub fn strip_fact_prefix(fallback_ordinal: u32, line: &str) -> Fact {
    if let Some(c) = FACT_PREFIX_RE.captures(line) {
        let ordinal = c[1].parse::<u32>().unwrap_or(fallback_ordinal);
        Fact {
            ordinal,
            timestamp: parse_fact_timestamp(&c[2]),
            text: c[3].trim().to_string(),
        }
    } else {
        Fact {
            ordinal: fallback_ordinal,
            timestamp: None,
            text: line.trim().to_string(),
        }
    }
}

fn parse_fact_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
}

pub fn facts_instruction() -> String {
    "From the news provided, produce a numbered list of facts relevant to the \
     company's share price, one fact per line, each formatted exactly as \
     `N) <ISO-8601 date>: <fact>`. Skip facts with no bearing on the share price."
        .to_string()
}

/// Full curation step: ask the service for a dated fact list, let the
/// provider prune it, strip prefixes from the survivors. The extraction call
/// is not retry-wrapped; its failure aborts the analyze operation.
pub async fn curate_facts(
    ai: &dyn AnalysisClient,
    news_text: &str,
    reviewer: &dyn CurationProvider,
) -> Result<Vec<Fact>> {
    let reply = ai
        .complete(CompletionRequest {
            system: facts_instruction(),
            user: news_text.to_string(),
            max_tokens: None,
            temperature: 0.0,
        })
        .await
        .context("fact extraction call")?;

    let mut lines: Vec<String> = reply
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    let drops = reviewer.review(&lines)?;
    apply_drops(&mut lines, &drops);

    Ok(lines
        .iter()
        .enumerate()
        .map(|(i, l)| strip_fact_prefix(i as u32 + 1, l))
        .collect())
}
