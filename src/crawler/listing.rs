//! Helpers for reading mirror directory listings.
//!
//! Listings are plain HTML indexes served by the mirror, so links and
//! versions are pulled out with regular expressions instead of an HTML parser.

use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Matches three single-digit components, e.g. `7.1.0`. Components with two
/// or more digits are never matched whole: `10.0.1` yields `0.0.1`.
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]\.[0-9]\.[0-9]").expect("valid version regex"));

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href=['"]?([^'" >]+)"#).expect("valid href regex"));

/// Join a path segment onto a URL with exactly one slash between them.
pub fn join_url(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

/// Join several segments onto a URL, left to right.
pub fn join_url_all(base: &str, segments: &[&str]) -> String {
    segments
        .iter()
        .fold(base.to_string(), |url, segment| join_url(&url, segment))
}

/// Distinct version strings found anywhere in a listing page.
pub fn extract_versions(page: &str) -> BTreeSet<String> {
    VERSION_RE
        .find_iter(page)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Every `href` attribute value in page order, duplicates included.
pub fn extract_hrefs(page: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(page)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The first configured extension that `href` ends with, if any.
pub fn matching_extension<'a>(href: &str, extensions: &'a [String]) -> Option<&'a str> {
    extensions
        .iter()
        .find(|extension| href.ends_with(extension.as_str()))
        .map(String::as_str)
}

/// Where a candidate's torrent lives on the mirror and where it is stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentTarget {
    pub url: String,
    pub path: PathBuf,
}

impl TorrentTarget {
    /// The local name is the last path segment of the href plus `.torrent`,
    /// so hrefs carrying directories cannot write outside `output_dir`.
    pub fn new(listing_url: &str, href: &str, output_dir: &Path) -> Self {
        let file_name = href.rsplit('/').next().unwrap_or(href);

        Self {
            url: format!("{}.torrent", join_url(listing_url, href)),
            path: output_dir.join(format!("{}.torrent", file_name)),
        }
    }
}
