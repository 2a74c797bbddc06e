use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "http://download.documentfoundation.org/libreoffice/";

/// Everything one crawl needs. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub skip_existing: bool,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_architectures")]
    pub architectures: Vec<String>,
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
    #[serde(default = "default_binary_branches")]
    pub binary_branches: Vec<String>,
    #[serde(default = "default_portable_branches")]
    pub portable_branches: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// Default value functions
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_extensions() -> Vec<String> {
    strings(&[
        ".tar.gz", ".tar.xz", ".tar.bz2", ".msi", ".dmg", ".paf.exe", ".flatpak", ".iso",
    ])
}
fn default_architectures() -> Vec<String> {
    strings(&["x86", "x86_64"])
}
fn default_platforms() -> Vec<String> {
    strings(&["deb", "mac", "rpm", "win"])
}
fn default_binary_branches() -> Vec<String> {
    strings(&["stable", "testing"])
}
fn default_portable_branches() -> Vec<String> {
    strings(&["src", "portable", "flatpack", "box"])
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_dir: None,
            skip_existing: false,
            extensions: default_extensions(),
            architectures: default_architectures(),
            platforms: default_platforms(),
            binary_branches: default_binary_branches(),
            portable_branches: default_portable_branches(),
        }
    }
}

impl CrawlConfig {
    /// Location of the optional per-user config file.
    pub fn default_config_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", "lotorrent").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from an explicit file, or from the per-user file
    /// when it exists, falling back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_config_file() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url cannot be empty");
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("base_url must be an http:// or https:// URL: '{}'", self.base_url);
        }

        if self.extensions.is_empty() {
            bail!("at least one extension must be configured");
        }

        if self.extensions.iter().any(|e| e.is_empty()) {
            bail!("extensions cannot contain an empty entry");
        }

        if !self.binary_branches.is_empty() {
            if self.platforms.is_empty() {
                bail!("binary branches are configured but the platform list is empty");
            }
            if self.architectures.is_empty() {
                bail!("binary branches are configured but the architecture list is empty");
            }
        }

        Ok(())
    }

    /// Resolve the directory torrents are written to, creating it if needed.
    /// Without a configured directory a fresh temporary one is created and
    /// left in place after the run.
    pub fn prepare_output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            None => {
                let dir = tempfile::Builder::new()
                    .suffix("-lotorrent")
                    .tempdir()
                    .context("Failed to create temporary output directory")?
                    .keep();
                info!(
                    "using temporary directory '{}' for output of downloaded torrents",
                    dir.display()
                );
                Ok(dir)
            }
            Some(dir) => {
                if !dir.exists() {
                    info!("creating missing output directory '{}'", dir.display());
                    fs::create_dir_all(dir)
                        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
                }
                Ok(dir.clone())
            }
        }
    }
}
