// Public library surface for integration tests (and potential reuse).

pub mod analyze;
pub mod cache;
pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod rank;
pub mod retry;

// ---- Re-exports for stable public API ----
pub use crate::analyze::ai_adapter;
pub use crate::cache::{CacheStore, JsonFileCache, NewsItem};
pub use crate::retry::{RetryPolicy, RetryState};
