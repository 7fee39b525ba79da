pub mod gate;
pub mod http;
pub mod rss;
pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;

/// Normalize one feed field: decode HTML entities, fold embedded newlines
/// (and any other whitespace runs) into single spaces, trim the ends.
pub fn normalize_field(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
    RE_WS.replace_all(decoded.as_ref(), " ").trim().to_string()
}
