//! Serving images crawled from a mocked subreddit over HTTP

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use image_soup::imagecrawler::{Echo, Reddit};
use image_soup::{webserver, Pool, Server};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post(url: &str, permalink: &str) -> Value {
    json!({"data": {"url": url, "permalink": permalink, "title": permalink}})
}

async fn mock_subreddit() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/pics.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "after": null,
                "children": [
                    post("https://i.test/a.jpg", "/r/pics/comments/a/"),
                    post("https://i.test/b.PNG?width=640", "/r/pics/comments/b/"),
                    post("https://i.test/page.html", "/r/pics/comments/c/"),
                ]
            }
        })))
        .mount(&mock_server)
        .await;
    mock_server
}

async fn get_json(server: &Arc<Server>, uri: &str) -> (StatusCode, Value) {
    let app = webserver::router(Arc::clone(server), false);
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_serve_until_empty_then_reset() {
    let mock_server = mock_subreddit().await;
    let base_url = Url::parse(&mock_server.uri()).unwrap();

    let mut pool = Pool::new();
    pool.add_source(
        Box::new(Reddit::with_base_url("pics", base_url).unwrap()),
        1.0,
        false,
    )
    .unwrap();
    let server = Arc::new(
        Server::new(pool, 5, 0)
            .with_fill_delay(Duration::ZERO)
            .with_refill_interval(Duration::from_secs(3600)),
    );
    server.start().await.unwrap();

    let (status, body) = get_json(&server, "/status/crawlers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["0"]["type"], "Reddit");
    assert_eq!(body["0"]["images"]["len"], 2);

    let mut served = Vec::new();
    for _ in 0..2 {
        let (status, body) = get_json(&server, "/get").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["source"]
            .as_str()
            .unwrap()
            .contains("/r/pics/comments/"));
        served.push(body["uri"].as_str().unwrap().to_string());
    }
    served.sort();
    assert_eq!(
        served,
        vec!["https://i.test/a.jpg", "https://i.test/b.PNG?width=640"]
    );

    // exhausted and without restart: the refill brings nothing new
    server.refill().await;
    let (status, _) = get_json(&server, "/get").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get_json(&server, "/status/server").await;
    assert_eq!(body["images"]["served"], 2);
    assert_eq!(body["images"]["crawled"], 2);

    let (_, body) = get_json(&server, "/reset").await;
    assert_eq!(body, json!({"requested": true, "timeout": 0}));

    // the crawler starts over and the blacklist no longer holds the uris
    server.refill().await;
    let (status, _) = get_json(&server, "/get").await;
    assert_eq!(status, StatusCode::OK);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_weighted_sources_share_one_blacklist() {
    let mut pool = Pool::new();
    let uri = "https://i.test/same.png";
    pool.add_source(Box::new(Echo::new(uri).unwrap()), 1.0, false)
        .unwrap();
    pool.add_source(Box::new(Echo::new(uri).unwrap()), 1.0, false)
        .unwrap_err();

    let server = Arc::new(Server::new(pool, 3, 3600).with_fill_delay(Duration::ZERO));
    server.refill().await;

    // echo images are generic, so the same uri may be waiting several times
    assert_eq!(server.pool().sources().get(0).unwrap().image_count(), 3);
    assert!(server.pool().blacklist().is_empty());

    let (status, body) = get_json(&server, "/get").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uri"], uri);
    assert_eq!(body["is_generic"], true);
    assert_eq!(body["extra"]["this_is_a_dummy"], true);
}
