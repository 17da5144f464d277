//! YouTubeClient against a mock Data API

use guardian_core::Error;
use guardian_youtube::{fetch_comments, CommentOrder, CommentSource, YouTubeClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn thread(text: &str, author: &str) -> Value {
    json!({
        "snippet": {
            "topLevelComment": {
                "snippet": {
                    "textDisplay": text,
                    "authorDisplayName": author,
                    "likeCount": 1,
                    "publishedAt": "2024-03-01T12:00:00Z"
                }
            }
        }
    })
}

#[tokio::test]
async fn test_paginates_with_page_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("pageToken", "page-2"))
        .and(query_param("maxResults", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [thread("second", "bob")]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("part", "snippet"))
        .and(query_param("videoId", "dQw4w9WgXcQ"))
        .and(query_param("maxResults", "2"))
        .and(query_param("textFormat", "plainText"))
        .and(query_param("order", "relevance"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [thread("first", "alice")],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = YouTubeClient::with_base_url("test-key", server.uri()).unwrap();
    let comments = fetch_comments(&client, "dQw4w9WgXcQ", 2, CommentOrder::Relevance)
        .await
        .unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "first");
    assert_eq!(comments[0].author, "alice");
    assert_eq!(comments[1].text, "second");
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The video has disabled comments."
            }
        })))
        .mount(&server)
        .await;

    let client = YouTubeClient::with_base_url("test-key", server.uri()).unwrap();
    let err = fetch_comments(&client, "dQw4w9WgXcQ", 10, CommentOrder::Time)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream(_)));
    assert!(err.to_string().contains("disabled comments"));
}

#[tokio::test]
async fn test_video_info() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "dQw4w9WgXcQ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "snippet": { "title": "Never Gonna Give You Up", "channelTitle": "Rick Astley" }
            }]
        })))
        .mount(&server)
        .await;

    let client = YouTubeClient::with_base_url("test-key", server.uri()).unwrap();
    let info = client.video_info("dQw4w9WgXcQ").await.unwrap();

    assert_eq!(info.video_id, "dQw4w9WgXcQ");
    assert_eq!(info.title, "Never Gonna Give You Up");
    assert_eq!(info.channel_title, "Rick Astley");
}

#[tokio::test]
async fn test_unknown_video_is_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let client = YouTubeClient::with_base_url("test-key", server.uri()).unwrap();
    let err = client.video_info("aaaaaaaaaaa").await.unwrap_err();
    assert!(err.is_client_error());
}
