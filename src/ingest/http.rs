// src/ingest/http.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::types::FeedSource;

/// Feed source backed by an HTTP URL template with `{symbol}` and `{count}`
/// placeholders.
pub struct HttpFeedSource {
    template: String,
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(template: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("stock-news-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            template: template.into(),
            client,
        }
    }

    pub fn url_for(&self, symbol: &str, count: u32) -> String {
        self.template
            .replace("{symbol}", symbol)
            .replace("{count}", &count.to_string())
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, symbol: &str, count: u32) -> Result<String> {
        let url = self.url_for(symbol, count);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("feed get {url}"))?
            .error_for_status()
            .with_context(|| format!("feed status {url}"))?;
        resp.text().await.context("feed body .text()")
    }

    fn name(&self) -> String {
        self.template.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_template_substitution() {
        let src = HttpFeedSource::new("https://example.test/rss?s={symbol}&count={count}");
        assert_eq!(
            src.url_for("TSLA", 100),
            "https://example.test/rss?s=TSLA&count=100"
        );
    }
}
