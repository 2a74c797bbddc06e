use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::listing::{TorrentTarget, extract_hrefs, matching_extension};
use crate::fetch::Fetcher;

/// Outcome counts for one scanned listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub candidates: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub unavailable: usize,
    pub failed: usize,
}

impl ScanReport {
    pub fn merge(&mut self, other: ScanReport) {
        self.candidates += other.candidates;
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.unavailable += other.unavailable;
        self.failed += other.failed;
    }
}

/// Fetch one listing page and try to store the torrent of every artifact on it
/// whose name ends in one of `extensions`.
///
/// Failing to fetch the listing itself is returned as an error. A torrent that
/// cannot be fetched is counted as unavailable, one that cannot be written is
/// counted as failed; either way the remaining candidates are still attempted.
pub async fn scan_and_download(
    fetcher: &dyn Fetcher,
    listing_url: &str,
    output_dir: &Path,
    extensions: &[String],
    skip_existing: bool,
) -> Result<ScanReport> {
    let page = fetcher
        .fetch(listing_url)
        .await
        .with_context(|| format!("Failed to fetch listing '{}'", listing_url))?;
    let page = String::from_utf8_lossy(&page);

    let hrefs = extract_hrefs(&page);
    debug!("found matches {:?} for url '{}'", hrefs, listing_url);

    let mut report = ScanReport::default();

    for href in &hrefs {
        if matching_extension(href, extensions).is_none() {
            continue;
        }
        report.candidates += 1;
        debug!("found matching download '{}'", href);

        let target = TorrentTarget::new(listing_url, href, output_dir);

        if skip_existing && target.path.exists() {
            info!("skipping existing torrent file '{}'", target.path.display());
            report.skipped += 1;
            continue;
        }

        debug!(
            "trying to download torrent '{}' to file '{}'",
            target.url,
            target.path.display()
        );

        match fetcher.fetch(&target.url).await {
            Ok(bytes) => match write_torrent(&target.path, &bytes) {
                Ok(()) => {
                    info!("downloaded torrent '{}'", target.path.display());
                    report.downloaded += 1;
                }
                Err(e) => {
                    warn!("could not store torrent '{}': {:#}", target.url, e);
                    report.failed += 1;
                }
            },
            Err(e) => {
                debug!(
                    "download of torrent '{}' failed (might not exist): {}",
                    target.url, e
                );
                report.unavailable += 1;
            }
        }
    }

    Ok(report)
}

/// Write through a `.part` sibling so a half-written file is never mistaken
/// for a finished torrent. The `.part` file is removed again on failure.
fn write_torrent(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = Path::new(&part);

    let result = fs::write(part, bytes)
        .with_context(|| format!("Failed to write torrent file: {:?}", part))
        .and_then(|()| {
            fs::rename(part, path)
                .with_context(|| format!("Failed to move torrent into place: {:?}", path))
        });

    if result.is_err() && part.exists() {
        let _ = fs::remove_file(part);
    }

    result
}
