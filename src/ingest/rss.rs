// src/ingest/rss.rs
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::normalize_field;
use crate::ingest::types::FeedItem;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<Field>,
    description: Option<Field>,
    #[serde(rename = "pubDate")]
    pub_date: Option<Field>,
    guid: Option<Field>,
    link: Option<Field>,
}

/// A child element that may carry attributes (e.g. `<guid
/// isPermaLink="false">`). We always want the textual payload, never the
/// wrapper; a missing or empty element yields the empty string.
#[derive(Debug, Deserialize)]
struct Field {
    #[serde(rename = "$text")]
    value: Option<String>,
}

fn text_of(f: &Option<Field>) -> String {
    f.as_ref()
        .and_then(|f| f.value.as_deref())
        .map(normalize_field)
        .unwrap_or_default()
}

/// Parse a raw feed document into normalized items, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let cleaned = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&cleaned).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let guid = text_of(&it.guid);
        out.push(FeedItem {
            title: text_of(&it.title),
            description: text_of(&it.description),
            pub_date: text_of(&it.pub_date),
            key: text_of(&it.link),
            guid: if guid.is_empty() { None } else { Some(guid) },
        });
    }
    Ok(out)
}

/// RFC-2822 `pubDate` to unix seconds; anything unparsable maps to 0.
pub fn parse_pub_date_unix(ts: &str) -> i64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .unwrap_or(0)
}

/// `pubDate` as an absolute instant; unparsable input maps to the epoch.
pub fn parse_pub_date(ts: &str) -> DateTime<Utc> {
    Utc.timestamp_opt(parse_pub_date_unix(ts), 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
