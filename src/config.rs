//! File-based configuration: feed URL templates for the export path and the
//! category map for ranking. Both accept TOML or JSON, with an env-var path
//! override and `config/` fallbacks.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::rank::CategoryMap;

const ENV_FEEDS_PATH: &str = "NEWS_FEEDS_PATH";
const ENV_CATEGORIES_PATH: &str = "STOCK_CATEGORIES_PATH";

/// Yahoo Finance headline feed, the reference source.
pub const DEFAULT_FEED_TEMPLATE: &str =
    "https://feeds.finance.yahoo.com/rss/2.0/headline?s={symbol}&region=US&lang=en-US&count={count}";

/// Load feed URL templates using env var + fallbacks:
/// 1) $NEWS_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// No config at all means the single default source.
pub fn load_feed_templates_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feed_templates_from(&pb);
        }
        return Err(anyhow!("NEWS_FEEDS_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feed_templates_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feed_templates_from(&json_p);
    }
    Ok(vec![DEFAULT_FEED_TEMPLATE.to_string()])
}

pub fn load_feed_templates_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feed_templates(&content, ext.as_str())
}

fn parse_feed_templates(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct FeedsFile {
        sources: Vec<String>,
    }
    let try_toml = hint_ext == "toml" || s.contains("sources");
    if try_toml {
        if let Ok(v) = toml::from_str::<FeedsFile>(s) {
            return Ok(clean_sources(v.sources));
        }
    }
    if let Ok(v) = serde_json::from_str::<Vec<String>>(s) {
        return Ok(clean_sources(v));
    }
    if !try_toml {
        if let Ok(v) = toml::from_str::<FeedsFile>(s) {
            return Ok(clean_sources(v.sources));
        }
    }
    Err(anyhow!("unsupported feeds format"))
}

/// Trim, drop empties, dedupe -- but keep configured order: sources are
/// processed strictly in this order on the export path.
fn clean_sources(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}

/// Load the category map using env var + fallbacks:
/// 1) $STOCK_CATEGORIES_PATH
/// 2) config/categories.toml
/// 3) config/categories.json
pub fn load_categories_default() -> Result<CategoryMap> {
    if let Ok(p) = std::env::var(ENV_CATEGORIES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_categories_from(&pb);
        }
        return Err(anyhow!("STOCK_CATEGORIES_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/categories.toml");
    if toml_p.exists() {
        return load_categories_from(&toml_p);
    }
    let json_p = PathBuf::from("config/categories.json");
    if json_p.exists() {
        return load_categories_from(&json_p);
    }
    Err(anyhow!(
        "no category map found; create config/categories.toml or set STOCK_CATEGORIES_PATH"
    ))
}

pub fn load_categories_from(path: &Path) -> Result<CategoryMap> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading categories from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ext == "toml" {
        return toml::from_str(&content).context("parsing categories toml");
    }
    if let Ok(v) = serde_json::from_str::<CategoryMap>(&content) {
        return Ok(v);
    }
    toml::from_str(&content).context("parsing categories")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn feeds_keep_configured_order_and_dedupe() {
        let toml = r#"sources = [" https://b/{symbol} ", "https://a/{symbol}", "https://b/{symbol}", ""]"#;
        let out = parse_feed_templates(toml, "toml").unwrap();
        assert_eq!(out, vec!["https://b/{symbol}", "https://a/{symbol}"]);

        let json = r#"["https://x/{symbol}", " https://x/{symbol} "]"#;
        let out = parse_feed_templates(json, "json").unwrap();
        assert_eq!(out, vec!["https://x/{symbol}"]);
    }

    #[test]
    fn categories_parse_from_both_formats() {
        let dir = tempfile::tempdir().unwrap();

        let toml_p = dir.path().join("cats.toml");
        std::fs::write(&toml_p, "[tech]\nTSLA = \"Tesla\"\nAAPL = \"Apple\"\n").unwrap();
        let m = load_categories_from(&toml_p).unwrap();
        assert_eq!(m["tech"]["TSLA"], "Tesla");

        let json_p = dir.path().join("cats.json");
        std::fs::write(&json_p, r#"{"tech":{"TSLA":"Tesla"}}"#).unwrap();
        let m = load_categories_from(&json_p).unwrap();
        assert_eq!(m["tech"]["TSLA"], "Tesla");
    }

    #[serial_test::serial]
    #[test]
    fn feeds_default_to_reference_source_without_config() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_FEEDS_PATH);

        let v = load_feed_templates_default().unwrap();
        assert_eq!(v, vec![DEFAULT_FEED_TEMPLATE.to_string()]);

        let p = tmp.path().join("feeds.json");
        std::fs::write(&p, r#"["https://x/{symbol}?n={count}"]"#).unwrap();
        env::set_var(ENV_FEEDS_PATH, p.display().to_string());
        let v2 = load_feed_templates_default().unwrap();
        assert_eq!(v2, vec!["https://x/{symbol}?n={count}".to_string()]);
        env::remove_var(ENV_FEEDS_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
