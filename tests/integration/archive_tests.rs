//! Integration tests for the archiver
//!
//! These tests use wiremock to serve a page and its assets and run the full
//! download, transform and write cycle end-to-end.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use page_archiver::config::Config;
use page_archiver::dom::{is_tag, Document};
use page_archiver::transform::{Pipeline, Stage};
use page_archiver::{ArchiveError, Archiver};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FONT_BYTES: &[u8] = b"\x00\x01\x00\x00fake-truetype";
const PHOTO_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-png";
const BACKGROUND_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;

/// Creates an archiver with a short backoff suitable for tests
fn test_archiver(sanitize_titles: bool) -> Archiver {
    let mut config = Config::default();
    config.retry.backoff_ms = 10;
    config.output.sanitize_titles = sanitize_titles;
    Archiver::from_config(&config).expect("Failed to build archiver")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_asset(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_archive_produces_self_contained_page() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/index.html",
        r##"<!DOCTYPE html>
<html>
<head>
<title>index</title>
<style>@font-face { font-family: Test; src: url('font.ttf'); }</style>
<link rel="stylesheet" href="site.css">
<script src="app.js"></script>
</head>
<body>
<div><img src="photo.png"></div>
<a href="#top">top</a>
<a href="about.html">about</a>
<script>console.log("inline");</script>
</body>
</html>"##,
    )
    .await;
    mount_asset(&server, "/font.ttf", FONT_BYTES).await;
    mount_asset(&server, "/photo.png", PHOTO_BYTES).await;
    mount_asset(
        &server,
        "/site.css",
        br#"body { background: url("img/bg.svg") no-repeat; }"#,
    )
    .await;
    mount_asset(&server, "/img/bg.svg", BACKGROUND_SVG.as_bytes()).await;

    let dir = tempfile::tempdir().unwrap();
    let page_url = format!("{}/index.html", server.uri());

    let written = test_archiver(false)
        .archive(dir.path(), &page_url)
        .await
        .expect("Archive failed");

    assert_eq!(written, dir.path().join("index.html"));
    assert_eq!(files_in(dir.path()), vec!["index.html".to_string()]);

    let html = std::fs::read_to_string(&written).unwrap();
    let doc = Document::parse(&html);

    // Exactly one style element, under head, holding all rewritten CSS
    let styles: Vec<_> = doc.find_all(doc.root(), is_tag("style")).collect();
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0].parent().unwrap().tag(), "head");

    let css = styles[0].text();
    assert!(css.contains(&format!(
        "url(data:font/ttf;base64,{})",
        STANDARD.encode(FONT_BYTES)
    )));
    assert!(css.contains(&format!(
        "url(data:image/svg+xml;base64,{})",
        STANDARD.encode(BACKGROUND_SVG)
    )));
    assert!(css.find("@font-face").unwrap() < css.find("body {").unwrap());

    // Images are inlined
    let img = doc.find(doc.root(), is_tag("img")).unwrap();
    assert_eq!(
        img.attr("src").unwrap(),
        format!("data:image/png;base64,{}", STANDARD.encode(PHOTO_BYTES))
    );

    // External references are gone
    assert!(doc.find(doc.root(), is_tag("link")).is_none());
    assert!(doc.find(doc.root(), is_tag("script")).is_none());

    // Anchors are absolute or same-page fragments
    let hrefs: Vec<&str> = doc
        .find_all(doc.root(), is_tag("a"))
        .filter_map(|a| a.attr("href"))
        .collect();
    assert_eq!(
        hrefs,
        vec!["#top".to_string(), format!("{}/about.html", server.uri())]
    );
}

#[tokio::test]
async fn test_missing_title_writes_nothing() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/untitled",
        "<html><head></head><body><p>No title here</p></body></html>",
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let err = test_archiver(false)
        .archive(dir.path(), &format!("{}/untitled", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ArchiveError::MissingElement(ref tag) if tag == "title"));
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn test_rate_limited_page_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/busy",
        "<html><head><title>busy</title></head><body></body></html>",
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let written = test_archiver(false)
        .archive(dir.path(), &format!("{}/busy", server.uri()))
        .await
        .expect("Rate limit should be retried");

    assert_eq!(written, dir.path().join("busy.html"));
}

#[tokio::test]
async fn test_failed_asset_is_attributed_to_stage() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/broken",
        r#"<html><head><title>broken</title></head><body><img src="gone.png"></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = test_archiver(false)
        .archive(dir.path(), &format!("{}/broken", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some("inline images"));
    assert!(err.to_string().starts_with("inline images: "));
    assert!(err.to_string().contains("404"));
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/first",
        "<html><head><title>first</title></head><body></body></html>",
    )
    .await;
    mount_page(
        &server,
        "/third",
        "<html><head><title>third</title></head><body></body></html>",
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let urls = vec![
        format!("{}/first", server.uri()),
        format!("{}/second", server.uri()),
        format!("{}/third", server.uri()),
    ];

    let report = test_archiver(false).archive_all(dir.path(), &urls).await;

    assert_eq!(report.len(), 3);
    assert!(!report.is_success());

    let failures: Vec<&str> = report.failures().map(|(url, _)| url).collect();
    assert_eq!(failures, vec![urls[1].as_str()]);
    assert_eq!(
        files_in(dir.path()),
        vec!["first.html".to_string(), "third.html".to_string()]
    );
}

#[tokio::test]
async fn test_sanitized_title_file_name() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/slashes",
        "<html><head><title>News/Weather: today</title></head><body></body></html>",
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let written = test_archiver(true)
        .archive(dir.path(), &format!("{}/slashes", server.uri()))
        .await
        .unwrap();

    assert_eq!(written.parent().unwrap(), dir.path());
    let name = written.file_name().unwrap().to_string_lossy().into_owned();
    assert!(!name.contains('/'));
    assert!(name.ends_with(".html"));
    assert_eq!(files_in(dir.path()), vec![name]);
}

#[tokio::test]
async fn test_custom_pipeline_replaces_archival_stages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/plain",
        r#"<html><head><title>plain</title><script src="app.js"></script></head><body><a href="next.html">next</a></body></html>"#,
    )
    .await;

    let pipeline = Pipeline::new().with_stage("resolve links", Stage::ResolveLinks);
    let dir = tempfile::tempdir().unwrap();
    let written = test_archiver(false)
        .with_pipeline(pipeline)
        .archive(dir.path(), &format!("{}/plain", server.uri()))
        .await
        .unwrap();

    let doc = Document::parse(&std::fs::read_to_string(written).unwrap());
    let script = doc.find(doc.root(), is_tag("script")).unwrap();
    assert_eq!(script.attr("src").unwrap(), format!("{}/app.js", server.uri()));
    assert!(doc.find(doc.root(), is_tag("style")).is_none());
}
