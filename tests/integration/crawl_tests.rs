//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock documentation sites and run the
//! full crawl cycle end-to-end against the static fetcher.

use std::path::Path;
use sumi_scribe::config::Config;
use sumi_scribe::crawler::{run_crawl, Coordinator, SKIP_EXISTING};
use sumi_scribe::output::{analyze_directory, convert_to_mdx, fix_formatting, OutputFormat};
use sumi_scribe::state::UrlState;
use sumi_scribe::storage::{cache_path_for, FrontierStore, SqliteStorage};
use sumi_scribe::ScribeError;
use tempfile::TempDir;
use tokio::sync::watch;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `base_url` into `dir`
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawl.base_url = Some(base_url.to_string());
    config.crawl.delay = 0.0;
    config.crawl.concurrency = 3;
    config.fetch.user_agent = "TestScribe/1.0".to_string();
    config.fetch.timeout_secs = 5;
    config.output.directory = dir.join("out");
    config.output.cache_dir = dir.join("cache");
    config
}

fn running() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            r#"<html><head><title>{}</title>
            <meta name="description" content="About {}">
            </head><body>
            <nav><a href="/docs/">Home</a></nav>
            <main>{}</main>
            <footer>Copyright</footer>
            </body></html>"#,
            title, title, body
        ),
        "text/html; charset=utf-8",
    )
}

/// Mounts a three-page documentation site under /docs/
async fn mount_docs_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html_page(
            "Docs",
            r#"<h1>Documentation</h1>
            <p>Start with the <a href="intro">introduction</a>.</p>
            <p>Then read <a href="/docs/setup#linux">setup</a>.</p>
            <p><a href="/docs/manual.pdf">PDF manual</a></p>
            <p><a href="https://elsewhere.example.org/">Elsewhere</a></p>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(html_page(
            "Intro",
            r#"<h2>Welcome</h2><p>Hello <code>world</code>.</p>
            <a href="setup">Setup</a>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/setup"))
        .respond_with(html_page(
            "Setup",
            r#"<h2>Install</h2><pre><code>cargo install thing</code></pre>"#,
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_writes_every_page() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());
    let config = create_test_config(&base_url, dir.path());

    let report = run_crawl(config, running()).await.unwrap();

    assert_eq!(report.stats.visited, 3);
    assert_eq!(report.stats.failed, 0);
    assert_eq!(report.stats.pending, 0);
    assert_eq!(report.saved_this_run, 3);

    let out = dir.path().join("out");
    for name in ["docs.md", "docs_intro.md", "docs_setup.md"] {
        assert!(out.join(name).exists(), "{} missing", name);
    }

    let intro = std::fs::read_to_string(out.join("docs_intro.md")).unwrap();
    assert!(intro.starts_with(&format!("---\nurl: \"{}/docs/intro\"\n", server.uri())));
    assert!(intro.contains("title: \"Intro\"\n"));
    assert!(intro.contains("description: \"About Intro\"\n"));
    assert!(intro.contains("scraped_at: "));
    assert!(intro.contains("## Welcome"));
    assert!(intro.contains("`world`"));
    assert!(!intro.contains("Copyright"));
}

#[tokio::test]
async fn test_crawl_state_is_persisted() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());
    let config = create_test_config(&base_url, dir.path());
    let cache = cache_path_for(
        &config.output.cache_dir,
        &Url::parse(&base_url).unwrap(),
        &config.output.directory,
    );

    run_crawl(config, running()).await.unwrap();

    let storage = SqliteStorage::new(&cache).unwrap();
    let records = storage.load_records().unwrap();
    let count = |state: UrlState| records.iter().filter(|r| r.state == state).count();
    assert_eq!(count(UrlState::Visited), 3);
    assert_eq!(count(UrlState::Discovered), 0);
}

#[tokio::test]
async fn test_existing_artifact_is_not_fetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html_page("Docs", r#"<a href="intro">Intro</a>"#))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());
    let config = create_test_config(&base_url, dir.path());
    std::fs::create_dir_all(&config.output.directory).unwrap();
    std::fs::write(config.output.directory.join("docs.md"), "kept").unwrap();

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run(running()).await.unwrap();

    assert_eq!(report.stats.skipped, 1);
    let record = coordinator.frontier().get(&base_url).unwrap();
    assert_eq!(record.state, UrlState::Skipped);
    assert_eq!(record.skip_reason.as_deref(), Some(SKIP_EXISTING));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("out/docs.md")).unwrap(),
        "kept"
    );
}

#[tokio::test]
async fn test_second_run_resumes_without_refetching() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html_page("Docs", r#"<a href="intro">Intro</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(html_page("Intro", "<p>Welcome.</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());

    let mut config = create_test_config(&base_url, dir.path());
    config.crawl.max_pages = Some(1);
    let first = run_crawl(config, running()).await.unwrap();
    assert_eq!(first.stats.visited, 1);
    assert_eq!(first.stats.pending, 1);

    let config = create_test_config(&base_url, dir.path());
    let second = run_crawl(config, running()).await.unwrap();
    assert_eq!(second.saved_this_run, 1);
    assert_eq!(second.stats.visited, 2);
    assert_eq!(second.stats.pending, 0);
}

#[tokio::test]
async fn test_max_pages_ceiling() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());
    let mut config = create_test_config(&base_url, dir.path());
    config.crawl.max_pages = Some(2);

    let report = run_crawl(config, running()).await.unwrap();

    assert_eq!(report.stats.visited, 2);
    assert_eq!(report.stats.processed(), 2);
    let written = std::fs::read_dir(dir.path().join("out")).unwrap().count();
    assert_eq!(written, 2);
}

#[tokio::test]
async fn test_failures_are_recorded_and_crawl_continues() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html_page(
            "Docs",
            r#"<a href="broken">Broken</a> <a href="report">Report</a> <a href="ok">Ok</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/report"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2], "application/pdf"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/ok"))
        .respond_with(html_page("Ok", "<p>Fine.</p>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());
    let mut coordinator = Coordinator::new(create_test_config(&base_url, dir.path())).unwrap();
    let report = coordinator.run(running()).await.unwrap();

    assert_eq!(report.stats.visited, 2);
    assert_eq!(report.stats.failed, 2);

    let broken = coordinator
        .frontier()
        .get(&format!("{}/docs/broken", server.uri()))
        .unwrap();
    assert_eq!(broken.state, UrlState::Failed);
    assert!(broken.error.as_deref().unwrap().contains("500"));
    assert!(broken.failed_at.is_some());
}

#[tokio::test]
async fn test_latin1_page_is_decoded() {
    let server = MockServer::start().await;

    let mut body = b"<html><head><title>Caf".to_vec();
    body.push(0xe9);
    body.extend_from_slice(b"</title></head><body><main><p>Cr");
    body.push(0xe8);
    body.extend_from_slice(b"me br");
    body.push(0xfb);
    body.extend_from_slice(b"l\xe9e</p></main></body></html>");

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=iso-8859-1"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());
    run_crawl(create_test_config(&base_url, dir.path()), running())
        .await
        .unwrap();

    let page = std::fs::read_to_string(dir.path().join("out/docs.md")).unwrap();
    assert!(page.contains("title: \"Café\""));
    assert!(page.contains("Crème brûlée"));
}

#[tokio::test]
async fn test_cancelled_crawl_keeps_progress() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let result = run_crawl(create_test_config(&base_url, dir.path()), rx).await;
    assert!(matches!(result, Err(ScribeError::Cancelled)));

    let report = run_crawl(create_test_config(&base_url, dir.path()), running())
        .await
        .unwrap();
    assert_eq!(report.stats.visited, 3);
}

#[tokio::test]
async fn test_mdx_output_and_utilities() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/docs/", server.uri());
    let config = create_test_config(&base_url, dir.path());
    let out = config.output.directory.clone();

    run_crawl(config, running()).await.unwrap();

    // Crawled output is already clean
    assert_eq!(fix_formatting(&out).unwrap(), 0);

    let analysis = analyze_directory(&out).unwrap();
    assert_eq!(analysis.total_files(), 3);

    assert_eq!(convert_to_mdx(&out).unwrap(), 3);
    assert!(out.join("docs_intro.mdx").exists());
    assert!(!out.join("docs_intro.md").exists());
    assert_eq!(convert_to_mdx(&out).unwrap(), 0);

    let mut mdx_config = create_test_config(&base_url, dir.path());
    mdx_config.output.directory = dir.path().join("mdx");
    mdx_config.output.format = OutputFormat::Mdx;
    run_crawl(mdx_config, running()).await.unwrap();
    assert!(dir.path().join("mdx/docs_setup.mdx").exists());
}
