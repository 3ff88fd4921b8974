//! End-to-end tests for `Scraper` against a local HTTP server.

use std::time::Duration;

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use scrapbook_client::{ExtractionResult, FetchConfig, Scraper};
use scrapbook_core::Error;
use tokio_util::sync::CancellationToken;

const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Tag Title</title>
    <meta property="og:title" content="Og Title">
    <meta property="og:image" content="https://cdn.example.com/og.jpg">
    <meta property="twitter:image" content="https://cdn.example.com/tw.jpg">
    <meta name="keywords" content="cooking,  , dessert ,,baking">
</head>
<body>
    <article>Art</article>
    <div class="content">Cont</div>
    <p>Para</p>
</body>
</html>"#;

fn scraper() -> Scraper {
    Scraper::new(FetchConfig { timeout: Duration::from_secs(5), ..Default::default() }).unwrap()
}

#[tokio::test]
async fn scrape_article_page() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/recipe");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(ARTICLE_HTML);
        })
        .await;

    let url = server.url("/recipe");
    let result = scraper().extract(&url).await.unwrap();
    mock.assert_async().await;

    assert_eq!(
        result,
        ExtractionResult {
            title: "Og Title".into(),
            content: "Art".into(),
            image_url: "https://cdn.example.com/og.jpg".into(),
            source_url: url,
            tags: vec!["cooking".into(), "dessert".into(), "baking".into()],
        }
    );
}

#[tokio::test]
async fn scrape_paragraph_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/notes");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body><p>A</p><p>B</p><p>C</p><p>D</p><p>E</p></body></html>");
        })
        .await;

    let result = scraper().extract(&server.url("/notes")).await.unwrap();
    assert_eq!(result.content, "A\n\nB\n\nC");
    assert_eq!(result.title, "");
    assert_eq!(result.image_url, "");
    assert!(result.tags.is_empty());
}

#[tokio::test]
async fn scrape_is_idempotent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/same");
            then.status(200).body(ARTICLE_HTML);
        })
        .await;

    let scraper = scraper();
    let url = server.url("/same");
    let first = scraper.extract(&url).await.unwrap();
    let second = scraper.extract(&url).await.unwrap();

    mock.assert_hits_async(2).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn scrape_declared_charset() {
    let server = MockServer::start_async().await;
    let mut body = b"<html><head><title>Caf".to_vec();
    body.push(0xE9);
    body.extend_from_slice(b"</title></head><body></body></html>");
    server
        .mock_async(move |when, then| {
            when.method(GET).path("/latin1");
            then.status(200)
                .header("content-type", "text/html; charset=iso-8859-1")
                .body(body.clone());
        })
        .await;

    let result = scraper().extract(&server.url("/latin1")).await.unwrap();
    assert_eq!(result.title, "Café");
}

#[tokio::test]
async fn scrape_ignores_declared_content_type() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/plain");
            then.status(200)
                .header("content-type", "text/plain")
                .body("<title>Still HTML</title><main>Body</main>");
        })
        .await;

    let result = scraper().extract(&server.url("/plain")).await.unwrap();
    assert_eq!(result.title, "Still HTML");
    assert_eq!(result.content, "Body");
}

#[tokio::test]
async fn scrape_follows_redirects() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/old");
            then.status(301).header("location", "/new");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/new");
            then.status(200).body("<title>Moved</title>");
        })
        .await;

    let url = server.url("/old");
    let result = scraper().extract(&url).await.unwrap();
    assert_eq!(result.title, "Moved");
    assert_eq!(result.source_url, url);
}

#[tokio::test]
async fn scrape_redirect_limit_is_fetch_error() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET).path("/r1");
            then.status(302).header("location", "/r2");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/r2");
            then.status(302).header("location", "/r3");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/r3");
            then.status(302).header("location", "/r4");
        })
        .await;

    let scraper = Scraper::new(FetchConfig { max_redirects: 1, ..Default::default() }).unwrap();
    let err = scraper.extract(&server.url("/r1")).await.unwrap_err();

    assert!(matches!(err, Error::RedirectFailed(_)), "expected redirect failure, got {err:?}");
    assert!(err.is_fetch());
    first.assert_hits_async(1).await;
}

#[tokio::test]
async fn scrape_redirect_loop_is_not_retried() {
    let server = MockServer::start_async().await;
    let a = server
        .mock_async(|when, then| {
            when.method(GET).path("/a");
            then.status(302).header("location", "/b");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/b");
            then.status(302).header("location", "/a");
        })
        .await;

    let scraper = Scraper::new(FetchConfig {
        max_redirects: 2,
        retries: 3,
        retry_backoff: Duration::from_millis(10),
        ..Default::default()
    })
    .unwrap();
    let err = scraper.extract(&server.url("/a")).await.unwrap_err();

    assert!(matches!(err, Error::RedirectFailed(_)), "expected redirect failure, got {err:?}");
    // One attempt: the first request plus the looped-back one.
    a.assert_hits_async(2).await;
}

#[tokio::test]
async fn scrape_sends_no_user_agent_by_default() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ua").header_missing("user-agent");
            then.status(200).body("<title>Anonymous</title>");
        })
        .await;

    let result = scraper().extract(&server.url("/ua")).await.unwrap();
    mock.assert_hits_async(1).await;
    assert_eq!(result.title, "Anonymous");
}

#[tokio::test]
async fn scrape_sends_configured_user_agent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ua").header("user-agent", "scrapbook-test/1.0");
            then.status(200).body("<title>Named</title>");
        })
        .await;

    let scraper = Scraper::new(FetchConfig {
        user_agent: Some("scrapbook-test/1.0".into()),
        ..Default::default()
    })
    .unwrap();
    let result = scraper.extract(&server.url("/ua")).await.unwrap();
    mock.assert_hits_async(1).await;
    assert_eq!(result.title, "Named");
}

#[tokio::test]
async fn scrape_not_found_is_fetch_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("<title>Not Found</title>");
        })
        .await;

    let err = scraper().extract(&server.url("/missing")).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus(404)));
    assert!(err.is_fetch());
}

#[tokio::test]
async fn scrape_error_page_when_accepted() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("<title>Not Found</title>");
        })
        .await;

    let scraper = Scraper::new(FetchConfig { accept_error_status: true, ..Default::default() }).unwrap();
    let result = scraper.extract(&server.url("/missing")).await.unwrap();
    assert_eq!(result.title, "Not Found");
}

#[tokio::test]
async fn scrape_unreachable_host_is_fetch_error() {
    let server = MockServer::start_async().await;
    let url = server.url("/gone");
    drop(server);

    let err = scraper().extract(&url).await.unwrap_err();
    assert!(err.is_fetch(), "expected fetch error, got {err:?}");
}

#[tokio::test]
async fn scrape_binary_body_is_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/logo.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D]);
        })
        .await;

    let err = scraper().extract(&server.url("/logo.png")).await.unwrap_err();
    assert!(err.is_parse(), "expected parse error, got {err:?}");
}

#[tokio::test]
async fn scrape_body_too_large() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/big");
            then.status(200).body("x".repeat(2048));
        })
        .await;

    let scraper = Scraper::new(FetchConfig { max_bytes: 1024, ..Default::default() }).unwrap();
    let err = scraper.extract(&server.url("/big")).await.unwrap_err();
    assert!(matches!(err, Error::FetchTooLarge(_)));
}

#[tokio::test]
async fn scrape_chunked_body_too_large() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // httpmock always sets Content-Length, so serve a chunked body by hand.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else { return };
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;

        let mut response =
            String::from("HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ntransfer-encoding: chunked\r\n\r\n");
        for _ in 0..4 {
            response.push_str(&format!("200\r\n{}\r\n", "x".repeat(512)));
        }
        response.push_str("0\r\n\r\n");
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    let scraper = Scraper::new(FetchConfig { max_bytes: 1024, ..Default::default() }).unwrap();
    let err = scraper.extract(&format!("http://{addr}/stream")).await.unwrap_err();
    assert!(matches!(err, Error::FetchTooLarge(_)), "expected size error, got {err:?}");
}

#[tokio::test]
async fn scrape_timeout_is_fetch_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(1500)).body("<title>Late</title>");
        })
        .await;

    let scraper = Scraper::new(FetchConfig { timeout: Duration::from_millis(200), ..Default::default() }).unwrap();
    let err = scraper.extract(&server.url("/slow")).await.unwrap_err();
    assert!(matches!(err, Error::FetchTimeout(_)), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn scrape_cancelled_mid_flight() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(2000)).body("<title>Late</title>");
        })
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = scraper()
        .extract_with_cancel(&server.url("/slow"), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(err.is_fetch());
}

#[tokio::test]
async fn scrape_retries_server_errors() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503);
        })
        .await;

    let scraper = Scraper::new(FetchConfig {
        retries: 2,
        retry_backoff: Duration::from_millis(10),
        ..Default::default()
    })
    .unwrap();
    let err = scraper.extract(&server.url("/flaky")).await.unwrap_err();

    mock.assert_hits_async(3).await;
    assert!(matches!(err, Error::HttpStatus(503)));
}

#[tokio::test]
async fn scrape_does_not_retry_client_errors() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/gone");
            then.status(410);
        })
        .await;

    let scraper = Scraper::new(FetchConfig { retries: 3, ..Default::default() }).unwrap();
    let err = scraper.extract(&server.url("/gone")).await.unwrap_err();

    mock.assert_hits_async(1).await;
    assert!(matches!(err, Error::HttpStatus(410)));
}

#[tokio::test]
async fn scrape_concurrent_calls_are_independent() {
    let server = MockServer::start_async().await;
    for n in 1..=4 {
        server
            .mock_async(move |when, then| {
                when.method(GET).path(format!("/page{n}"));
                then.status(200).body(format!("<title>Page {n}</title>"));
            })
            .await;
    }

    let scraper = scraper();
    let urls: Vec<String> = (1..=4).map(|n| server.url(format!("/page{n}"))).collect();
    let handles: Vec<_> = urls
        .iter()
        .cloned()
        .map(|url| {
            let scraper = scraper.clone();
            tokio::spawn(async move { scraper.extract(&url).await })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.title, format!("Page {}", n + 1));
        assert_eq!(result.source_url, urls[n]);
    }
}
