pub mod listing;
pub mod scanner;

pub use listing::{TorrentTarget, extract_hrefs, extract_versions, join_url, matching_extension};
pub use scanner::{ScanReport, scan_and_download};

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::CrawlConfig;
use crate::fetch::Fetcher;

/// Totals for a whole crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub listings_scanned: usize,
    pub torrents: ScanReport,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listings scanned, {} candidates, {} torrents downloaded, {} skipped, {} unavailable, {} failed",
            self.listings_scanned,
            self.torrents.candidates,
            self.torrents.downloaded,
            self.torrents.skipped,
            self.torrents.unavailable,
            self.torrents.failed
        )
    }
}

/// Walks every configured branch of the mirror and stores the torrents it finds.
pub struct Crawler<'a> {
    fetcher: &'a dyn Fetcher,
    config: &'a CrawlConfig,
    output_dir: PathBuf,
}

impl<'a> Crawler<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, config: &'a CrawlConfig, output_dir: PathBuf) -> Self {
        Self {
            fetcher,
            config,
            output_dir,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Binary branches are expanded over every platform and architecture,
    /// portable branches are scanned at the version level. Any listing that
    /// cannot be fetched ends the run with an error.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for branch in &self.config.binary_branches {
            let versions = self.branch_versions(branch, "binary").await?;

            for version in &versions {
                for platform in &self.config.platforms {
                    for architecture in &self.config.architectures {
                        let url = listing::join_url_all(
                            &self.config.base_url,
                            &[
                                branch.as_str(),
                                version.as_str(),
                                platform.as_str(),
                                architecture.as_str(),
                            ],
                        );
                        self.scan(&url, &mut summary).await?;
                    }
                }
            }
        }

        for branch in &self.config.portable_branches {
            let versions = self.branch_versions(branch, "portable").await?;

            for version in &versions {
                let url = listing::join_url_all(
                    &self.config.base_url,
                    &[branch.as_str(), version.as_str()],
                );
                self.scan(&url, &mut summary).await?;
            }
        }

        info!("crawl finished: {}", summary);
        Ok(summary)
    }

    /// URL of a branch's top-level listing.
    pub fn branch_url(&self, branch: &str) -> String {
        join_url(&self.config.base_url, branch)
    }

    async fn branch_versions(&self, branch: &str, kind: &str) -> Result<BTreeSet<String>> {
        let url = self.branch_url(branch);
        let page = self
            .fetcher
            .fetch(&url)
            .await
            .with_context(|| format!("Failed to fetch listing for {} branch '{}'", kind, branch))?;

        let versions = extract_versions(&String::from_utf8_lossy(&page));
        debug!(
            "found versions {:?} for {} branch '{}'",
            versions, kind, branch
        );
        Ok(versions)
    }

    async fn scan(&self, url: &str, summary: &mut RunSummary) -> Result<()> {
        let report = scan_and_download(
            self.fetcher,
            url,
            &self.output_dir,
            &self.config.extensions,
            self.config.skip_existing,
        )
        .await?;

        summary.listings_scanned += 1;
        summary.torrents.merge(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;
    use tempfile::TempDir;

    const BASE: &str = "http://mirror/lo/";

    fn config(binary: &[&str], portable: &[&str]) -> CrawlConfig {
        let list = |v: &[&str]| -> Vec<String> { v.iter().map(|s| s.to_string()).collect() };
        CrawlConfig {
            base_url: BASE.to_string(),
            extensions: list(&[".deb", ".tar.xz"]),
            architectures: list(&["x86", "x86_64"]),
            platforms: list(&["deb"]),
            binary_branches: list(binary),
            portable_branches: list(portable),
            ..Default::default()
        }
    }

    #[test]
    fn test_branch_url_has_single_slash() {
        let fetcher = MockFetcher::new();
        let mut cfg = config(&["stable"], &[]);
        let crawler = Crawler::new(&fetcher, &cfg, PathBuf::from("/out"));
        assert_eq!(crawler.branch_url("stable"), "http://mirror/lo/stable");

        cfg.base_url = "http://mirror/lo".to_string();
        let crawler = Crawler::new(&fetcher, &cfg, PathBuf::from("/out"));
        assert_eq!(crawler.branch_url("testing"), "http://mirror/lo/testing");
    }

    #[tokio::test]
    async fn test_binary_branch_expands_matrix() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config(&["stable"], &[]);
        let fetcher = MockFetcher::new()
            .with_page("http://mirror/lo/stable", "7.1.0/ 7.1.0/ 6.4.2/")
            .with_page("http://mirror/lo/stable/7.1.0/deb/x86", "")
            .with_page("http://mirror/lo/stable/7.1.0/deb/x86_64", "")
            .with_page("http://mirror/lo/stable/6.4.2/deb/x86", "")
            .with_page("http://mirror/lo/stable/6.4.2/deb/x86_64", "");

        let summary = Crawler::new(&fetcher, &cfg, temp_dir.path().to_path_buf())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.listings_scanned, 4);
        assert_eq!(fetcher.request_count(), 5);
        assert_eq!(
            fetcher.times_requested("http://mirror/lo/stable/7.1.0/deb/x86_64"),
            1
        );
    }

    #[tokio::test]
    async fn test_portable_branch_skips_platform_matrix() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config(&[], &["src"]);
        let fetcher = MockFetcher::new()
            .with_page("http://mirror/lo/src", "<a href=\"7.1.0/\">7.1.0/</a>")
            .with_page(
                "http://mirror/lo/src/7.1.0",
                "<a href=\"libreoffice-7.1.0.tar.xz\">src</a>",
            )
            .with_page(
                "http://mirror/lo/src/7.1.0/libreoffice-7.1.0.tar.xz.torrent",
                "SRC",
            );

        let summary = Crawler::new(&fetcher, &cfg, temp_dir.path().to_path_buf())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.listings_scanned, 1);
        assert_eq!(summary.torrents.downloaded, 1);
        assert!(
            temp_dir
                .path()
                .join("libreoffice-7.1.0.tar.xz.torrent")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_branch_listing_failure_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config(&["stable"], &["src"]);
        let fetcher = MockFetcher::new().with_transport_error("http://mirror/lo/stable");

        let err = Crawler::new(&fetcher, &cfg, temp_dir.path().to_path_buf())
            .run()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("stable"));
        // The portable branch is never reached
        assert_eq!(fetcher.times_requested("http://mirror/lo/src"), 0);
    }

    #[tokio::test]
    async fn test_version_listing_failure_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config(&[], &["src", "portable"]);
        let fetcher = MockFetcher::new()
            .with_page("http://mirror/lo/src", "7.1.0")
            .with_page("http://mirror/lo/portable", "7.1.0");

        let result = Crawler::new(&fetcher, &cfg, temp_dir.path().to_path_buf())
            .run()
            .await;

        assert!(result.is_err());
        assert_eq!(fetcher.times_requested("http://mirror/lo/portable"), 0);
    }

    #[tokio::test]
    async fn test_branch_listing_with_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config(&[], &["src"]);
        let fetcher = MockFetcher::new()
            .with_page("http://mirror/lo/src", b"\xff7.1.0\xfe".to_vec())
            .with_page("http://mirror/lo/src/7.1.0", "");

        let summary = Crawler::new(&fetcher, &cfg, temp_dir.path().to_path_buf())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.listings_scanned, 1);
        assert_eq!(fetcher.times_requested("http://mirror/lo/src/7.1.0"), 1);
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            listings_scanned: 2,
            torrents: ScanReport {
                candidates: 3,
                downloaded: 1,
                skipped: 1,
                unavailable: 1,
                failed: 0,
            },
        };
        assert_eq!(
            summary.to_string(),
            "2 listings scanned, 3 candidates, 1 torrents downloaded, 1 skipped, 1 unavailable, 0 failed"
        );
    }
}
