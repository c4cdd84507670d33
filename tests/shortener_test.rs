//! Tests for the link shortening client against a mock provider

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

use movie_catalog::config::ShortenerConfig;
use movie_catalog::model::DownloadLink;
use movie_catalog::shortener::LinkShortener;

fn link(label: &str, url: &str) -> DownloadLink {
    DownloadLink {
        label: label.into(),
        url: url.into(),
        size: None,
        quality: None,
        click_count: 0,
    }
}

fn shortener_for(server: &MockServer, concurrency: usize, timeout: Duration) -> LinkShortener {
    LinkShortener::new(&ShortenerConfig {
        base_url: format!("{}/api", server.uri()),
        api_token: "secret".into(),
        timeout,
        concurrency,
    })
}

/// Replies `https://s/<label>` where the label is the last url segment,
/// after a delay chosen per url so that later links can finish first.
struct DelayedShortener;

impl Respond for DelayedShortener {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let target = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "url")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        let slug = target.rsplit('/').next().unwrap_or_default().to_string();
        let delay = match slug.as_str() {
            "first" => 300,
            "second" => 150,
            _ => 0,
        };

        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(delay))
            .set_body_json(json!({ "shortenedUrl": format!("https://s/{slug}") }))
    }
}

#[tokio::test]
async fn test_successful_shortening_sends_token_and_encoded_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("api", "secret"))
        .and(query_param("url", "http://host/file?a=1&b=two words"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "shortenedUrl": "https://s/x" })))
        .expect(1)
        .mount(&server)
        .await;

    let shortener = shortener_for(&server, 1, Duration::from_secs(5));
    let source = link("GDrive", "http://host/file?a=1&b=two words");
    let short = shortener.shorten(std::slice::from_ref(&source)).await;

    assert_eq!(short.len(), 1);
    assert_eq!(short[0].url, "https://s/x");
    assert_eq!(short[0].original_url, source.url);
    assert_eq!(short[0].label, "GDrive");
    assert_eq!(short[0].click_count, 0);
}

#[tokio::test]
async fn test_missing_field_falls_back_to_original() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "error" })))
        .mount(&server)
        .await;

    let shortener = shortener_for(&server, 1, Duration::from_secs(5));
    let short = shortener.shorten(&[link("A", "http://a")]).await;

    assert_eq!(short[0].url, "http://a");
    assert_eq!(short[0].original_url, "http://a");
}

#[tokio::test]
async fn test_non_json_body_falls_back_to_original() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let shortener = shortener_for(&server, 1, Duration::from_secs(5));
    let short = shortener.shorten(&[link("A", "http://a")]).await;

    assert_eq!(short[0].url, "http://a");
    assert_eq!(short[0].original_url, "http://a");
}

#[tokio::test]
async fn test_timeout_falls_back_without_aborting_other_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("url", "http://slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "shortenedUrl": "https://s/slow" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("url", "http://fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "shortenedUrl": "https://s/fast" })))
        .mount(&server)
        .await;

    let shortener = shortener_for(&server, 1, Duration::from_millis(200));
    let short = shortener
        .shorten(&[link("Slow", "http://slow"), link("Fast", "http://fast")])
        .await;

    assert_eq!(short.len(), 2);
    assert_eq!(short[0].url, "http://slow");
    assert_eq!(short[0].original_url, "http://slow");
    assert_eq!(short[1].url, "https://s/fast");
}

#[tokio::test]
async fn test_unreachable_provider_falls_back_for_every_link() {
    let server = MockServer::start().await;
    let shortener = shortener_for(&server, 1, Duration::from_secs(2));
    drop(server);

    let links = vec![link("A", "http://a"), link("B", "http://b")];
    let short = shortener.shorten(&links).await;

    assert_eq!(short.len(), 2);
    for (short, source) in short.iter().zip(&links) {
        assert_eq!(short.url, source.url);
        assert_eq!(short.original_url, source.url);
    }
}

#[tokio::test]
async fn test_parallel_shortening_keeps_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(DelayedShortener)
        .expect(3)
        .mount(&server)
        .await;

    let shortener = shortener_for(&server, 3, Duration::from_secs(5));
    let short = shortener
        .shorten(&[
            link("1", "http://files/first"),
            link("2", "http://files/second"),
            link("3", "http://files/third"),
        ])
        .await;

    let urls: Vec<&str> = short.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec!["https://s/first", "https://s/second", "https://s/third"]);
}

#[tokio::test]
async fn test_sequential_shortening_sends_requests_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(DelayedShortener)
        .mount(&server)
        .await;

    let shortener = shortener_for(&server, 1, Duration::from_secs(5));
    shortener
        .shorten(&[
            link("1", "http://files/first"),
            link("2", "http://files/second"),
            link("3", "http://files/third"),
        ])
        .await;

    let received = server.received_requests().await.unwrap();
    let order: Vec<String> = received
        .iter()
        .filter_map(|req| {
            req.url
                .query_pairs()
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
        })
        .collect();
    assert_eq!(
        order,
        vec!["http://files/first", "http://files/second", "http://files/third"]
    );
}
