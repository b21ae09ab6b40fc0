use std::path::PathBuf;

use crate::FetchSettings;
use feed_core::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_BASE: &str = "https://hacker-news.firebaseio.com/v0/";

/// Cache key the ranking snapshot is stored under.
pub const BEST_STORIES_KEY: &str = "bestStories";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_base_url: String,
    pub page_size: usize,
    pub fetch: FetchSettings,
    pub cache_dir: PathBuf,
    pub cache_key: String,
}

impl EngineConfig {
    pub fn default_with_cache(cache_dir: PathBuf) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            fetch: FetchSettings::default(),
            cache_dir,
            cache_key: BEST_STORIES_KEY.to_string(),
        }
    }
}
