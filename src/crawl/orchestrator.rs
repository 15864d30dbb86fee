// src/crawl/orchestrator.rs
// =============================================================================
// This module runs a crawl from start to finish.
//
// How it works:
// 1. Fetch the seed page (if this fails, nothing is written and we stop)
// 2. Create the results directory and start the writer task
// 3. Send the seed page to the writer, before anything else
// 4. Extract links from the seed page and spawn one fetch task per link
// 5. Each task sends its page to the writer, or logs why it couldn't
// 6. Wait for every task to finish, then close the writer's inbox
// 7. Wait for the writer to drain its inbox
//
// Only one hop: links found on child pages are never followed.
//
// Rust concepts:
// - tokio::spawn: Runs a future as an independent task
// - Arc: Shared ownership across tasks (the counters, the semaphore)
// - mpsc::Sender::clone(): Each task gets its own handle to the channel
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

use super::barrier::{CompletionBarrier, TaskGuard};
use super::config::{CrawlConfig, WRITER_INBOX_CAPACITY};
use super::error::CrawlError;
use crate::archive::{working_dir, PageResult, ResultWriter};
use crate::scrape::{extract_links, Fetcher};

/// What a finished crawl did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub output_dir: PathBuf,
    /// Every href on the seed page, duplicates included
    pub links_found: usize,
    /// Child fetches that ended in an error (the crawl still succeeds)
    pub fetch_failures: usize,
    /// Files written, seed page included
    pub pages_written: usize,
    pub write_failures: usize,
}

/// Fetches a seed page and everything it links to, and archives the lot
#[derive(Debug)]
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Fetcher,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let fetcher =
            Fetcher::new(config.timeout, config.status_policy).map_err(CrawlError::Client)?;
        Ok(Self { config, fetcher })
    }

    pub async fn run(&self, target: &str) -> Result<CrawlReport, CrawlError> {
        info!(url = target, "fetching seed page");
        let root_body = self
            .fetcher
            .fetch(target)
            .await
            .map_err(CrawlError::RootFetch)?;
        info!(url = target, bytes = root_body.len(), "fetched seed page");

        let output_root = match &self.config.output_root {
            Some(root) => root.clone(),
            None => working_dir()?,
        };
        let writer = ResultWriter::open(&output_root, target).await?;
        let output_dir = writer.output_dir().to_path_buf();

        let (pages_tx, pages_rx) = mpsc::channel(WRITER_INBOX_CAPACITY);
        let writer_task = tokio::spawn(writer.accept(pages_rx));

        let fan_out = self.fan_out(target, root_body, pages_tx).await?;
        let summary = writer_task.await?;

        let report = CrawlReport {
            output_dir,
            links_found: fan_out.links_found,
            fetch_failures: fan_out.fetch_failures,
            pages_written: summary.written,
            write_failures: summary.failed,
        };
        info!(
            output_dir = %report.output_dir.display(),
            links = report.links_found,
            fetch_failures = report.fetch_failures,
            written = report.pages_written,
            write_failures = report.write_failures,
            "crawl finished"
        );
        Ok(report)
    }

    // Sends the seed page, then one page per link that could be fetched.
    // Consumes `pages` so the channel is closed on return, which is only
    // reached after every fetch task has finished.
    async fn fan_out(
        &self,
        target: &str,
        root_body: Vec<u8>,
        pages: mpsc::Sender<PageResult>,
    ) -> Result<FanOut, CrawlError> {
        let links = extract_links(&root_body);
        info!(count = links.len(), "found links on seed page");

        pages
            .send(PageResult {
                source_url: target.to_string(),
                body: root_body,
            })
            .await
            .map_err(|_| CrawlError::WriterClosed)?;

        let barrier = CompletionBarrier::new();
        let failures = Arc::new(AtomicUsize::new(0));
        let permits = self.config.concurrency.map(|n| Arc::new(Semaphore::new(n)));

        for link in &links {
            let task = ChildFetch {
                fetcher: self.fetcher.clone(),
                pages: pages.clone(),
                permits: permits.clone(),
                failures: Arc::clone(&failures),
                url: link.clone(),
                _guard: barrier.enter(),
            };
            tokio::spawn(task.run());
        }

        debug!(outstanding = barrier.outstanding(), "waiting for fetch tasks");
        barrier.wait().await;

        // Every task has sent or skipped; this is the last sender
        drop(pages);

        Ok(FanOut {
            links_found: links.len(),
            fetch_failures: failures.load(Ordering::SeqCst),
        })
    }
}

struct FanOut {
    links_found: usize,
    fetch_failures: usize,
}

// Everything one fetch task needs, moved into the task in one piece
struct ChildFetch {
    fetcher: Fetcher,
    pages: mpsc::Sender<PageResult>,
    permits: Option<Arc<Semaphore>>,
    failures: Arc<AtomicUsize>,
    url: String,
    // Last field, so it drops after the sender when the task ends
    _guard: TaskGuard,
}

impl ChildFetch {
    async fn run(self) {
        let _permit = match &self.permits {
            Some(permits) => Arc::clone(permits).acquire_owned().await.ok(),
            None => None,
        };

        debug!(url = %self.url, "fetching child link");
        match self.fetcher.fetch(&self.url).await {
            Ok(body) => {
                let page = PageResult {
                    source_url: self.url.clone(),
                    body,
                };
                if self.pages.send(page).await.is_err() {
                    warn!(url = %self.url, "writer closed before page could be sent");
                }
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "failed to fetch child link");
                self.failures.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::sanitize;
    use crate::scrape::StatusPolicy;
    use std::collections::BTreeSet;
    use std::path::Path;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(root: &Path) -> CrawlConfig {
        CrawlConfig::default()
            .with_timeout(Duration::from_millis(500))
            .with_output_root(root)
    }

    async fn mount_page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn anchors(hrefs: &[String]) -> String {
        hrefs
            .iter()
            .map(|href| format!(r#"<a href="{href}">link</a>"#))
            .collect()
    }

    fn file_names(dir: &Path) -> BTreeSet<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_failed_child_is_skipped_and_crawl_succeeds() {
        let server = MockServer::start().await;
        let a = format!("{}/a", server.uri());
        let b = format!("{}/b", server.uri());
        let c = format!("{}/c", server.uri());

        mount_page(&server, "/", &anchors(&[a.clone(), b.clone(), c.clone()])).await;
        mount_page(&server, "/a", "page a").await;
        mount_page(&server, "/c", "page c").await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let target = format!("{}/", server.uri());
        let report = Crawler::new(config(root.path())).unwrap().run(&target).await.unwrap();

        assert_eq!(report.links_found, 3);
        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.pages_written, 3);
        assert_eq!(report.write_failures, 0);

        let expected: BTreeSet<String> =
            [&target, &a, &c].iter().map(|url| sanitize(url)).collect();
        assert_eq!(file_names(&report.output_dir), expected);
        assert_eq!(
            std::fs::read_to_string(report.output_dir.join(sanitize(&a))).unwrap(),
            "page a"
        );
    }

    #[tokio::test]
    async fn test_root_failure_creates_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let target = format!("{}/slow", server.uri());
        let err = Crawler::new(config(root.path())).unwrap().run(&target).await.unwrap_err();

        assert!(matches!(err, CrawlError::RootFetch(_)));
        assert!(!root.path().join(format!("{}_results", sanitize(&target))).exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unfetchable_hrefs_count_as_failures() {
        let server = MockServer::start().await;
        let page = format!("{}/ok", server.uri());
        let seed = format!(
            r##"<a href="">empty</a><a href="/relative">rel</a><a href="mailto:x@y.z">mail</a><a href="{page}">ok</a>"##
        );
        mount_page(&server, "/", &seed).await;
        mount_page(&server, "/ok", "fine").await;

        let root = tempfile::tempdir().unwrap();
        let report = Crawler::new(config(root.path()))
            .unwrap()
            .run(&format!("{}/", server.uri()))
            .await
            .unwrap();

        assert_eq!(report.links_found, 4);
        assert_eq!(report.fetch_failures, 3);
        assert_eq!(report.pages_written, 2);
    }

    #[tokio::test]
    async fn test_fifty_links_fan_out() {
        let server = MockServer::start().await;
        let links: Vec<String> = (0..50).map(|i| format!("{}/page/{i}", server.uri())).collect();
        mount_page(&server, "/", &anchors(&links)).await;
        for i in 0..50 {
            mount_page(&server, &format!("/page/{i}"), &format!("body {i}")).await;
        }

        let root = tempfile::tempdir().unwrap();
        let report = Crawler::new(config(root.path()))
            .unwrap()
            .run(&format!("{}/", server.uri()))
            .await
            .unwrap();

        assert_eq!(report.links_found, 50);
        assert_eq!(report.fetch_failures, 0);
        assert_eq!(report.pages_written, 51);
        assert_eq!(file_names(&report.output_dir).len(), 51);
        for (i, link) in links.iter().enumerate() {
            let body = std::fs::read_to_string(report.output_dir.join(sanitize(link))).unwrap();
            assert_eq!(body, format!("body {i}"));
        }
    }

    #[tokio::test]
    async fn test_concurrency_cap_keeps_accounting() {
        let server = MockServer::start().await;
        let links: Vec<String> = (0..50).map(|i| format!("{}/p{i}", server.uri())).collect();
        mount_page(&server, "/", &anchors(&links)).await;
        for i in 0..50 {
            Mock::given(method("GET"))
                .and(path(format!("/p{i}")))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string("child")
                        .set_delay(Duration::from_millis(10)),
                )
                .mount(&server)
                .await;
        }

        let root = tempfile::tempdir().unwrap();
        let report = Crawler::new(config(root.path()).with_concurrency(Some(4)))
            .unwrap()
            .run(&format!("{}/", server.uri()))
            .await
            .unwrap();

        assert_eq!(report.fetch_failures, 0);
        assert_eq!(report.pages_written, 51);
    }

    #[tokio::test]
    async fn test_rerun_replaces_previous_results() {
        let server = MockServer::start().await;
        let link = format!("{}/child", server.uri());
        mount_page(&server, "/", &anchors(&[link.clone()])).await;
        mount_page(&server, "/child", "child").await;

        let root = tempfile::tempdir().unwrap();
        let target = format!("{}/", server.uri());
        let crawler = Crawler::new(config(root.path())).unwrap();

        let first = crawler.run(&target).await.unwrap();
        std::fs::write(first.output_dir.join("stale"), "left over").unwrap();

        let second = crawler.run(&target).await.unwrap();
        assert_eq!(first.output_dir, second.output_dir);
        assert!(!second.output_dir.join("stale").exists());
        assert_eq!(file_names(&second.output_dir).len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_status_is_a_child_failure() {
        let server = MockServer::start().await;
        let gone = format!("{}/gone", server.uri());
        mount_page(&server, "/", &anchors(&[gone.clone()])).await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let target = format!("{}/", server.uri());

        let accepting = Crawler::new(config(root.path())).unwrap().run(&target).await.unwrap();
        assert_eq!(accepting.pages_written, 2);
        assert_eq!(
            std::fs::read_to_string(accepting.output_dir.join(sanitize(&gone))).unwrap(),
            "missing"
        );

        let rejecting = Crawler::new(config(root.path()).with_status_policy(StatusPolicy::Reject))
            .unwrap()
            .run(&target)
            .await
            .unwrap();
        assert_eq!(rejecting.fetch_failures, 1);
        assert_eq!(rejecting.pages_written, 1);
    }

    #[tokio::test]
    async fn test_seed_page_is_sent_first() {
        let server = MockServer::start().await;
        let links: Vec<String> = (0..5).map(|i| format!("{}/c{i}", server.uri())).collect();
        for i in 0..5 {
            mount_page(&server, &format!("/c{i}"), "child").await;
        }

        let root = tempfile::tempdir().unwrap();
        let crawler = Crawler::new(config(root.path())).unwrap();
        let target = format!("{}/", server.uri());
        let (pages_tx, mut pages_rx) = mpsc::channel(WRITER_INBOX_CAPACITY);

        let fan_out = crawler
            .fan_out(&target, anchors(&links).into_bytes(), pages_tx)
            .await
            .unwrap();
        assert_eq!(fan_out.links_found, 5);

        // fan_out dropped the last sender, so this drains and stops
        let mut received = Vec::new();
        while let Some(page) = pages_rx.recv().await {
            received.push(page.source_url);
        }
        assert_eq!(received.len(), 6);
        assert_eq!(received[0], target);
        let children: BTreeSet<String> = received[1..].iter().cloned().collect();
        assert_eq!(children, links.into_iter().collect());
    }
}
