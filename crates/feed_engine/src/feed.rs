use std::collections::BTreeMap;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use feed_core::{FeedState, Operation, SnapshotEntry, Status, Story, StoryId};
use futures_util::{stream, StreamExt};

use crate::{
    EngineConfig, EngineError, FetchError, FileSnapshotStore, ReqwestSource, SnapshotStore,
    StorySource, BEST_STORIES_KEY,
};

/// Synchronization engine for one ranked feed.
///
/// Operations take `&mut self`, so they cannot interleave on one engine.
/// Transport failures never surface as errors: they set the status and the
/// affected records degrade to stubs.
pub struct FeedEngine {
    source: Arc<dyn StorySource>,
    store: Arc<dyn SnapshotStore>,
    state: FeedState,
    cache_key: String,
    max_in_flight: usize,
}

impl FeedEngine {
    pub fn new(
        source: Arc<dyn StorySource>,
        store: Arc<dyn SnapshotStore>,
        page_size: usize,
    ) -> Self {
        Self {
            source,
            store,
            state: FeedState::new(page_size),
            cache_key: BEST_STORIES_KEY.to_string(),
            max_in_flight: usize::MAX,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let source = ReqwestSource::new(&config.api_base_url, config.fetch.clone())?;
        let store = FileSnapshotStore::new(config.cache_dir.clone());
        Ok(Self::new(Arc::new(source), Arc::new(store), config.page_size)
            .with_cache_key(config.cache_key.clone())
            .with_max_in_flight(config.fetch.max_in_flight))
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    /// Zero is treated as one.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn status(&self) -> &Status {
        self.state.status()
    }

    pub fn has_error(&self) -> bool {
        self.state.status().has_error()
    }

    pub fn error_message(&self) -> &str {
        self.state.status().message()
    }

    pub fn loaded_count(&self) -> usize {
        self.state.loaded_count()
    }

    pub fn ranking_len(&self) -> usize {
        self.state.ranking().len()
    }

    /// The view window in rank order.
    pub fn stories(&self) -> Vec<Arc<Story>> {
        self.state.records().to_vec()
    }

    pub async fn run(&mut self, op: Operation) -> Vec<Arc<Story>> {
        match op {
            Operation::InitialLoad => self.initial_load().await,
            Operation::LoadMore => self.load_more().await,
            Operation::Refresh => self.refresh().await,
        }
    }

    /// Fetches the ranking and materialises its first page.
    pub async fn initial_load(&mut self) -> Vec<Arc<Story>> {
        self.state.begin_operation();

        let ranking = self.fetch_ranking().await;
        let ranking_ok = ranking.is_some();
        self.state.reset_ranking(ranking.unwrap_or_default());
        self.load_next_page().await;

        if ranking_ok {
            self.persist(&self.state.window_snapshot());
        }
        engine_info!(
            "initial load: {} of {} stories loaded",
            self.state.loaded_count(),
            self.state.ranking().len()
        );
        self.stories()
    }

    /// Materialises the next page of the stored ranking.
    pub async fn load_more(&mut self) -> Vec<Arc<Story>> {
        self.state.begin_operation();
        self.load_next_page().await;
        engine_info!(
            "load more: {} of {} stories loaded",
            self.state.loaded_count(),
            self.state.ranking().len()
        );
        self.stories()
    }

    /// Re-fetches the ranking and reconciles the view window against it.
    ///
    /// When the ranking itself cannot be fetched the state is left as is.
    pub async fn refresh(&mut self) -> Vec<Arc<Story>> {
        self.state.begin_operation();

        let Some(new_ids) = self.fetch_ranking().await else {
            return self.stories();
        };

        let plan = self.state.plan_refresh(new_ids);
        engine_debug!(
            "refresh: ranking of {}, {} in-view positions changed",
            plan.new_ids().len(),
            plan.fetches().len()
        );
        let targets = plan.fetches().iter().map(|f| (f.position, f.id)).collect();
        let fetched = self.fetch_batch(targets).await;
        self.state.apply_refresh(plan, fetched);

        self.persist(&self.state.ranking_snapshot());
        engine_info!(
            "refresh: {} of {} stories loaded",
            self.state.loaded_count(),
            self.state.ranking().len()
        );
        self.stories()
    }

    async fn fetch_ranking(&mut self) -> Option<Vec<StoryId>> {
        match self.source.fetch_ranking().await {
            Ok(ids) => Some(ids),
            Err(err) => {
                engine_warn!("ranking fetch failed: {}", err);
                self.record_failure(&err);
                None
            }
        }
    }

    async fn load_next_page(&mut self) {
        let request = self.state.next_page();
        if request.is_empty() {
            return;
        }

        let targets = request
            .ids
            .iter()
            .enumerate()
            .map(|(offset, id)| (request.start + offset, *id))
            .collect();
        let mut fetched = self.fetch_batch(targets).await;
        let stories = (request.start..request.start + request.ids.len())
            .filter_map(|position| fetched.remove(&position))
            .collect();

        if !self.state.apply_page(&request, stories) {
            engine_error!("page starting at {} no longer matches the ranking", request.start);
        }
    }

    /// Fetches every target concurrently and keys the results by position.
    ///
    /// Failed fetches and null payloads come back as stubs.
    async fn fetch_batch(&mut self, targets: Vec<(usize, StoryId)>) -> BTreeMap<usize, Arc<Story>> {
        let source = self.source.as_ref();
        let results: Vec<(usize, StoryId, Result<Option<Story>, FetchError>)> =
            stream::iter(targets)
                .map(|(position, id)| async move { (position, id, source.fetch_story(id).await) })
                .buffer_unordered(self.max_in_flight)
                .collect()
                .await;

        let mut fetched = BTreeMap::new();
        for (position, id, result) in results {
            let story = match result {
                Ok(Some(story)) => story,
                Ok(None) => {
                    engine_debug!("story {} has no payload", id);
                    Story::stub(id)
                }
                Err(err) => {
                    engine_warn!("story {} fetch failed: {}", id, err);
                    self.record_failure(&err);
                    Story::stub(id)
                }
            };
            fetched.insert(position, Arc::new(story));
        }
        fetched
    }

    fn record_failure(&mut self, err: &FetchError) {
        let message = if err.message.is_empty() {
            err.kind.to_string()
        } else {
            err.message.clone()
        };
        self.state.record_failure(message);
    }

    fn persist(&self, entries: &[SnapshotEntry]) {
        if let Err(err) = self.store.save(&self.cache_key, entries) {
            engine_error!("failed to persist snapshot {:?}: {}", self.cache_key, err);
        }
    }
}
