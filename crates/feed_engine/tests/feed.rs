mod common;

use std::sync::Arc;

use common::{api_base, init_logging, mount_feed, ranked_ids, score_of};
use feed_engine::{
    FeedEngine, FetchSettings, MemorySnapshotStore, ReqwestSource, SnapshotEntry, SnapshotStore,
    BEST_STORIES_KEY,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_engine(server: &MockServer, page_size: usize) -> (FeedEngine, Arc<MemorySnapshotStore>) {
    let source = ReqwestSource::new(&api_base(server), FetchSettings::default()).unwrap();
    let store = Arc::new(MemorySnapshotStore::new());
    let engine = FeedEngine::new(Arc::new(source), store.clone(), page_size);
    (engine, store)
}

#[tokio::test]
async fn load_more_and_refresh_over_http() {
    init_logging();
    let server = MockServer::start().await;
    mount_feed(&server, 30).await;
    let (mut engine, store) = http_engine(&server, 10);

    let first = engine.initial_load().await;
    assert_eq!(first.len(), 10);
    assert_eq!(engine.loaded_count(), 10);
    assert!(!engine.has_error());
    let ids: Vec<_> = first.iter().map(|s| s.id).collect();
    assert_eq!(ids, ranked_ids(30)[..10].to_vec());
    let scores: Vec<_> = first.iter().map(|s| s.score.unwrap()).collect();
    assert!(scores.windows(2).all(|pair| pair[0] > pair[1]));

    let snapshot = store.load(BEST_STORIES_KEY).unwrap().expect("snapshot written");
    assert_eq!(snapshot.len(), 10);

    let more = engine.load_more().await;
    assert_eq!(more.len(), 20);
    assert_eq!(engine.loaded_count(), 20);
    let ids: Vec<_> = more.iter().map(|s| s.id).collect();
    assert_eq!(ids, ranked_ids(30)[..20].to_vec());

    let refreshed = engine.refresh().await;
    assert_eq!(refreshed.len(), 20);
    assert!(!engine.has_error());
    assert_eq!(engine.error_message(), "");
    for (before, after) in more.iter().zip(&refreshed) {
        assert!(Arc::ptr_eq(before, after));
    }

    // Refresh persists the whole ranking, unfetched tail as bare ids.
    let snapshot = store.load(BEST_STORIES_KEY).unwrap().expect("snapshot written");
    assert_eq!(snapshot.len(), 30);
    assert!(matches!(snapshot[19], SnapshotEntry::Story(_)));
    assert_eq!(snapshot[20], SnapshotEntry::Id(ranked_ids(30)[20]));
}

#[tokio::test]
async fn failed_ranking_yields_empty_result_and_error() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/beststories.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let (mut engine, store) = http_engine(&server, 10);

    let stories = engine.initial_load().await;
    assert!(stories.is_empty());
    assert_eq!(engine.loaded_count(), 0);
    assert!(engine.has_error());
    assert_eq!(engine.error_message(), "Internal Server Error");
    assert!(store.raw(BEST_STORIES_KEY).is_none());
}

#[tokio::test]
async fn failed_item_degrades_to_stub_and_sets_status() {
    init_logging();
    let server = MockServer::start().await;
    let broken = ranked_ids(30)[3];
    Mock::given(method("GET"))
        .and(path(format!("/v0/item/{broken}.json")))
        .respond_with(ResponseTemplate::new(502))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_feed(&server, 30).await;
    let (mut engine, _store) = http_engine(&server, 10);

    let stories = engine.initial_load().await;
    assert_eq!(stories.len(), 10);
    assert!(stories[3].is_stub());
    assert_eq!(stories[3].id, broken);
    assert!(stories.iter().filter(|s| s.is_stub()).count() == 1);
    assert!(engine.has_error());
    assert_eq!(engine.error_message(), "Bad Gateway");

    // The next operation starts from a clean status.
    engine.load_more().await;
    assert!(!engine.has_error());
}

#[tokio::test]
async fn null_item_is_a_stub_without_error() {
    init_logging();
    let server = MockServer::start().await;
    let missing = ranked_ids(12)[0];
    Mock::given(method("GET"))
        .and(path(format!("/v0/item/{missing}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_feed(&server, 12).await;
    let (mut engine, _store) = http_engine(&server, 5);

    let stories = engine.initial_load().await;
    assert!(stories[0].is_stub());
    assert_eq!(score_of(stories[1].id), stories[1].score.unwrap());
    assert!(!engine.has_error());
}
