// src/cache.rs
//! Per-symbol durable store for processed news items, plus the tab-separated
//! export sheet rendered from it.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable representation of one fully processed news item, keyed by its
/// canonical link. Never mutated after creation; only the timestamp is
/// re-materialized when the record is re-read on a later run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    /// Normalized price-impact score in [-5, 5].
    pub forecast_score: i32,
    /// Canonical link; unique within a symbol's cache at all times.
    pub key: String,
    pub guid: Option<String>,
}

/// Store interface injected into the item processor, so persistence policy
/// can vary independently of scoring logic. `commit` is the write-through
/// unit: the entry becomes visible to `get` only once it is durable, so a
/// failed commit leaves the store exactly as it was and a retry redoes the
/// whole write. A crash mid-run loses at most the item currently being
/// processed.
pub trait CacheStore {
    fn get(&self, key: &str) -> Option<&NewsItem>;
    fn commit(&mut self, item: NewsItem) -> Result<()>;
    fn items(&self) -> &[NewsItem];
}

/// JSON-file-backed cache, one file per symbol under the output directory.
pub struct JsonFileCache {
    path: PathBuf,
    items: Vec<NewsItem>,
    index: HashMap<String, usize>,
}

impl JsonFileCache {
    /// Open (or create empty) the cache for one symbol. A missing file is an
    /// empty cache; a corrupt or unreadable file is an error. Only NotFound
    /// maps to empty: treating any read error as an empty cache would let the
    /// next commit overwrite previously committed items.
    pub fn open(dir: &Path, symbol: &str) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let path = dir.join(format!("{symbol}.cache.json"));
        let items: Vec<NewsItem> = match fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s)
                .with_context(|| format!("parsing cache {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading cache {}", path.display()))
            }
        };
        let index = items
            .iter()
            .enumerate()
            .map(|(i, it)| (it.key.clone(), i))
            .collect();
        Ok(Self { path, items, index })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(items: &[NewsItem], path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(items).context("serializing cache")?;
        let tmp = path.with_extension("json.tmp");
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes()).context("writing cache tmp")?;
        fs::rename(&tmp, path).context("committing cache file")?;
        Ok(())
    }
}

impl CacheStore for JsonFileCache {
    fn get(&self, key: &str) -> Option<&NewsItem> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    fn commit(&mut self, item: NewsItem) -> Result<()> {
        // Key uniqueness holds at all times; a duplicate commit is a no-op.
        if self.index.contains_key(&item.key) {
            return Ok(());
        }
        self.items.push(item);
        match Self::write_file(&self.items, &self.path) {
            Ok(()) => {
                let i = self.items.len() - 1;
                self.index.insert(self.items[i].key.clone(), i);
                Ok(())
            }
            Err(e) => {
                // Roll back so a retried commit redoes the durable write.
                self.items.pop();
                Err(e)
            }
        }
    }

    fn items(&self) -> &[NewsItem] {
        &self.items
    }
}

/// Render the export sheet: header plus one tab-separated row per item,
/// ascending by publication date. Field normalization upstream guarantees no
/// embedded tabs or newlines.
pub fn to_tab_separated(items: &[NewsItem]) -> String {
    let mut sorted: Vec<&NewsItem> = items.iter().collect();
    sorted.sort_by_key(|it| it.published_at);

    let mut out = String::from("Title\tDescription\tPublication Date\tForecast\tGUID\tLink\n");
    for it in sorted {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            it.title,
            it.description,
            it.published_at.to_rfc2822(),
            it.forecast_score,
            it.guid.as_deref().unwrap_or_default(),
            it.key,
        ));
    }
    out
}

/// Write the sheet to `<dir>/<symbol>.txt` and return the path.
pub fn write_export(dir: &Path, symbol: &str, items: &[NewsItem]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{symbol}.txt"));
    fs::write(&path, to_tab_separated(items))
        .with_context(|| format!("writing export {}", path.display()))?;
    Ok(path)
}
