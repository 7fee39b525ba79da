use anyhow::Result;

/// One normalized entry from a source feed. `pub_date` stays a raw string at
/// this stage; the export path parses it to an instant before storing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub pub_date: String,
    /// Canonical link; the sole deduplication identity.
    pub key: String,
    pub guid: Option<String>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the raw feed document for one symbol. No internal retry; the
    /// caller decides whether a failure is retried or skipped.
    async fn fetch(&self, symbol: &str, count: u32) -> Result<String>;
    fn name(&self) -> String;
}
