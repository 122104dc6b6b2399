//! Session state: the listing, its tree, and the derived views for one load.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::ListingConfig;
use crate::error::Result;
use crate::extract::{FileRecord, extract_files};
use crate::fetch::{FetchProgress, HttpListingSource, ListingSource, fetch_all_objects};
use crate::tree::{NodeId, Tree, build_tree};
use crate::views;

/// Builds the HTTP client used for listing requests.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("bucket-listing/", env!("CARGO_PKG_VERSION")))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}

/// Everything a renderer needs for one loaded listing.
///
/// A session is read-only once loaded; renderers that expand or collapse
/// directories work on their own copy of the tree.
#[derive(Debug, Clone)]
pub struct Session {
    title: String,
    files: Vec<FileRecord>,
    tree: Tree,
    window_start: DateTime<Utc>,
}

impl Session {
    /// Fetches the listing described by `config` over HTTP and builds a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the listing
    /// cannot be fetched.
    pub async fn fetch(config: &ListingConfig, progress: &dyn FetchProgress) -> Result<Self> {
        let source = HttpListingSource::new(build_http_client()?, config);
        log::info!("Listing {} from {}", config.bucket, source.endpoint());
        Self::load(config, &source, progress).await
    }

    /// Runs the full pipeline against `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched.
    pub async fn load(
        config: &ListingConfig,
        source: &dyn ListingSource,
        progress: &dyn FetchProgress,
    ) -> Result<Self> {
        let raw = fetch_all_objects(source, config.max_retries, progress).await?;
        let files = extract_files(&raw, &config.bucket);
        Ok(Self::from_files(config, files, Utc::now()))
    }

    /// Builds a session from an already extracted file list.
    #[must_use]
    pub fn from_files(config: &ListingConfig, files: Vec<FileRecord>, now: DateTime<Utc>) -> Self {
        let mut tree = build_tree(&files, &config.bucket);
        if files.len() > config.large_listing_threshold {
            log::info!(
                "{} files exceed the threshold of {}; tree starts collapsed",
                files.len(),
                config.large_listing_threshold
            );
            tree.set_show(NodeId::ROOT, false);
        }

        let window_start = views::window_start(now, config.recent_days).unwrap_or_else(|| {
            log::warn!(
                "recent window of {} days is out of range; every file counts as recent",
                config.recent_days
            );
            DateTime::<Utc>::MIN_UTC
        });

        Self {
            title: config.title(),
            files,
            tree,
            window_start,
        }
    }

    /// Page title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The flat file list in backend order.
    #[must_use]
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Start of the "recently modified" window.
    #[must_use]
    pub const fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    /// Files whose path contains `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&FileRecord> {
        views::search(&self.files, query)
    }

    /// Files modified within the window, newest first.
    #[must_use]
    pub fn recent(&self) -> Vec<&FileRecord> {
        views::recent(&self.files, self.window_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{ListingPage, parse_page};
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::fetch::NoProgress;

    /// Serves a fixed list of XML documents, one per request.
    struct XmlPages {
        pages: Vec<String>,
        next: AtomicUsize,
    }

    impl XmlPages {
        fn new(pages: Vec<String>) -> Self {
            Self {
                pages,
                next: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ListingSource for XmlPages {
        async fn fetch_page(&self, _marker: Option<&str>) -> Result<ListingPage> {
            let i = self.next.fetch_add(1, Ordering::SeqCst) % self.pages.len();
            parse_page(&self.pages[i])
        }
    }

    fn page(truncated: bool, entries: &[(&str, &str)]) -> String {
        let contents: String = entries
            .iter()
            .map(|(key, modified)| {
                format!(
                    "<Contents><Key>{key}</Key><LastModified>{modified}</LastModified>\
                     <Size>100</Size></Contents>"
                )
            })
            .collect();
        format!("<ListBucketResult><IsTruncated>{truncated}</IsTruncated>{contents}</ListBucketResult>")
    }

    fn snapshot() -> Vec<String> {
        vec![
            page(
                true,
                &[
                    ("index.html", "2020-01-01T00:00:00.000Z"),
                    ("opx/1.0/image.bin", "2020-01-01T00:00:00.000Z"),
                    ("opx/2.0/image.bin", "2020-02-01T00:00:00.000Z"),
                ],
            ),
            page(
                false,
                &[
                    ("opx/3.0/image.bin", "2020-03-01T00:00:00.000Z"),
                    ("pool/dists/stable/Release", "2020-03-01T00:00:00.000Z"),
                    ("tools/readme.txt", "2020-03-02T00:00:00.000Z"),
                ],
            ),
        ]
    }

    #[tokio::test]
    async fn load_runs_full_pipeline() {
        let config = ListingConfig::new("archive.example.net");
        let source = XmlPages::new(snapshot());
        let session = Session::load(&config, &source, &NoProgress).await.unwrap();

        assert_eq!(session.title(), "archive.example.net Listing");
        let paths: Vec<_> = session.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "opx/1.0/image.bin",
                "opx/2.0/image.bin",
                "opx/3.0/image.bin",
                "tools/readme.txt",
            ]
        );

        let tree = session.tree();
        assert_eq!(tree.root().name, "archive.example.net");
        let opx = tree.lookup("opx").unwrap();
        let releases: Vec<_> = tree
            .children(opx)
            .map(|c| (c.name.as_str(), c.show))
            .collect();
        assert_eq!(releases, vec![("3.0", true), ("2.0", false), ("1.0", false)]);
    }

    #[tokio::test]
    async fn pipeline_is_idempotent() {
        let config = ListingConfig::new("archive.example.net");
        let first = Session::load(&config, &XmlPages::new(snapshot()), &NoProgress)
            .await
            .unwrap();
        let second = Session::load(&config, &XmlPages::new(snapshot()), &NoProgress)
            .await
            .unwrap();
        assert_eq!(first.tree(), second.tree());
        assert_eq!(first.files(), second.files());
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_load() {
        let config = ListingConfig::new("b");
        let source = XmlPages::new(vec!["<html>not a listing</html>".to_string()]);
        assert!(Session::load(&config, &source, &NoProgress).await.is_err());
    }

    #[test]
    fn large_listing_starts_collapsed() {
        let config = ListingConfig::new("b").with_large_listing_threshold(2);
        let files: Vec<_> = ["a/1", "a/2", "a/3"]
            .into_iter()
            .map(crate::tree::tests::file)
            .collect();
        let session = Session::from_files(&config, files, Utc::now());
        assert!(!session.tree().root().show);
        assert_eq!(session.files().len(), 3);
    }

    #[test]
    fn listing_at_threshold_stays_expanded() {
        let config = ListingConfig::new("b").with_large_listing_threshold(2);
        let files: Vec<_> = ["a/1", "a/2"]
            .into_iter()
            .map(crate::tree::tests::file)
            .collect();
        let session = Session::from_files(&config, files, Utc::now());
        assert!(session.tree().root().show);
    }

    #[test]
    fn views_use_session_window() {
        let now = Utc::now();
        let config = ListingConfig::new("b");
        let mut old = crate::tree::tests::file("a/old.txt");
        old.last_modified = now - ChronoDuration::days(10);
        let mut new = crate::tree::tests::file("a/new.txt");
        new.last_modified = now - ChronoDuration::days(1);

        let session = Session::from_files(&config, vec![old, new], now);
        let recent: Vec<_> = session.recent().into_iter().map(|f| f.name.as_str()).collect();
        assert_eq!(recent, vec!["new.txt"]);
        assert_eq!(session.search("OLD").len(), 1);
        assert!(session.search("").is_empty());
        assert_eq!(session.window_start(), now - ChronoDuration::days(7));
    }

    #[test]
    fn oversized_recent_window_covers_everything() {
        let config = ListingConfig::new("b").with_recent_days(i64::MAX / 1000);
        let files = vec![crate::tree::tests::file("a/b.txt")];
        let session = Session::from_files(&config, files, Utc::now());
        assert_eq!(session.window_start(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(session.recent().len(), 1);
    }
}
