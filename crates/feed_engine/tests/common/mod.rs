#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use feed_engine::{FailureKind, FeedEngine, FetchError, MemorySnapshotStore, Story, StoryId, StorySource};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}

/// Deterministic, distinct scores for ids 1..=99.
pub fn score_of(id: StoryId) -> i64 {
    ((id * 37) % 100) as i64
}

pub fn story(id: StoryId) -> Story {
    Story {
        title: Some(format!("Story {id}")),
        url: Some(format!("https://example.com/{id}")),
        score: Some(score_of(id)),
        by: Some(format!("User {id}")),
        time: Some(1_700_000_000),
        descendants: Some((id % 7) as u32),
        ..Story::stub(id)
    }
}

/// Ids `1..=count` ordered by descending score.
pub fn ranked_ids(count: StoryId) -> Vec<StoryId> {
    let mut ids: Vec<StoryId> = (1..=count).collect();
    ids.sort_by_key(|id| std::cmp::Reverse(score_of(*id)));
    ids
}

/// In-process source with a replaceable ranking and a record of every fetch.
#[derive(Default)]
pub struct FakeSource {
    ranking: Mutex<Vec<StoryId>>,
    ranking_status: Mutex<Option<u16>>,
    failing: Mutex<HashSet<StoryId>>,
    fetched: Mutex<Vec<StoryId>>,
}

impl FakeSource {
    pub fn with_ranking(ranking: Vec<StoryId>) -> Arc<Self> {
        let source = Self::default();
        *source.ranking.lock().unwrap() = ranking;
        Arc::new(source)
    }

    pub fn set_ranking(&self, ranking: Vec<StoryId>) {
        *self.ranking.lock().unwrap() = ranking;
    }

    pub fn fail_ranking(&self, status: Option<u16>) {
        *self.ranking_status.lock().unwrap() = status;
    }

    pub fn fail_story(&self, id: StoryId) {
        self.failing.lock().unwrap().insert(id);
    }

    /// Ids fetched since the last call, sorted.
    pub fn take_fetched(&self) -> Vec<StoryId> {
        let mut ids: Vec<_> = self.fetched.lock().unwrap().drain(..).collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait::async_trait]
impl StorySource for FakeSource {
    async fn fetch_ranking(&self) -> Result<Vec<StoryId>, FetchError> {
        if let Some(code) = *self.ranking_status.lock().unwrap() {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(code),
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(self.ranking.lock().unwrap().clone())
    }

    async fn fetch_story(&self, id: StoryId) -> Result<Option<Story>, FetchError> {
        self.fetched.lock().unwrap().push(id);
        if self.failing.lock().unwrap().contains(&id) {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(500),
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(Some(story(id)))
    }
}

pub fn fake_engine(source: &Arc<FakeSource>, page_size: usize) -> (FeedEngine, Arc<MemorySnapshotStore>) {
    let store = Arc::new(MemorySnapshotStore::new());
    let engine = FeedEngine::new(source.clone(), store.clone(), page_size);
    (engine, store)
}

/// Serves the ranking and `count` records under `/v0/`.
pub async fn mount_feed(server: &MockServer, count: StoryId) {
    Mock::given(method("GET"))
        .and(path("/v0/beststories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ranked_ids(count)))
        .mount(server)
        .await;

    for id in 1..=count {
        Mock::given(method("GET"))
            .and(path(format!("/v0/item/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(story(id)))
            .mount(server)
            .await;
    }
}

pub fn api_base(server: &MockServer) -> String {
    format!("{}/v0/", server.uri())
}
