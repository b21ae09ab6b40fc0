mod common;

use std::time::Duration;

use common::{api_base, init_logging, ranked_ids, story};
use feed_engine::{FailureKind, FetchSettings, ReqwestSource, StorySource};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn ranking_is_returned_in_remote_order() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/beststories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ranked_ids(5)))
        .mount(&server)
        .await;

    let source = ReqwestSource::new(&api_base(&server), FetchSettings::default()).unwrap();
    let ranking = source.fetch_ranking().await.expect("ranking ok");
    assert_eq!(ranking, ranked_ids(5));
}

#[tokio::test]
async fn base_url_without_trailing_slash_is_accepted() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(story(3)))
        .mount(&server)
        .await;

    let base = format!("{}/v0", server.uri());
    let source = ReqwestSource::new(&base, FetchSettings::default()).unwrap();
    let fetched = source.fetch_story(3).await.expect("story ok");
    assert_eq!(fetched, Some(story(3)));
}

#[tokio::test]
async fn null_payload_is_not_an_error() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/404.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let source = ReqwestSource::new(&api_base(&server), FetchSettings::default()).unwrap();
    assert_eq!(source.fetch_story(404).await.unwrap(), None);
}

#[tokio::test]
async fn unknown_fields_are_ignored() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/8.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id":8,"type":"story","title":"Eight","score":12,"kids":[9,10],"dead":false}"#,
        ))
        .mount(&server)
        .await;

    let source = ReqwestSource::new(&api_base(&server), FetchSettings::default()).unwrap();
    let fetched = source.fetch_story(8).await.unwrap().expect("payload");
    assert_eq!(fetched.title.as_deref(), Some("Eight"));
    assert_eq!(fetched.kind.as_deref(), Some("story"));
    assert_eq!(fetched.kids, vec![9, 10]);
}

#[tokio::test]
async fn http_status_failure_carries_reason_phrase() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/beststories.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = ReqwestSource::new(&api_base(&server), FetchSettings::default()).unwrap();
    let err = source.fetch_ranking().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(err.message, "Service Unavailable");
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/beststories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2, \"three\"]"))
        .mount(&server)
        .await;

    let source = ReqwestSource::new(&api_base(&server), FetchSettings::default()).unwrap();
    let err = source.fetch_ranking().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/1.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(story(1)),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let source = ReqwestSource::new(&api_base(&server), settings).unwrap();
    let err = source.fetch_story(1).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/beststories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1,2,3,4,5]"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 4,
        ..FetchSettings::default()
    };
    let source = ReqwestSource::new(&api_base(&server), settings).unwrap();
    let err = source.fetch_ranking().await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 4,
            actual: Some(11)
        }
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(ReqwestSource::new("not a url", FetchSettings::default()).is_err());
}
