use clap::Parser;
use lotorrent::CrawlConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lotorrent")]
#[command(about = "Download release torrents published on a LibreOffice download mirror")]
#[command(long_about = "
lotorrent walks the directory listings of a LibreOffice download mirror, finds
release archives for every configured branch, platform and architecture, and
downloads the .torrent file published next to each archive.

Examples:
  lotorrent                                   # Crawl everything into a temp dir
  lotorrent -o ~/torrents --skip-existing     # Incremental run into a fixed dir
  lotorrent --binary-branches stable --platforms deb --architectures x86_64
  lotorrent --binary-branches '' --portable-branches src
")]
#[command(version)]
pub struct Cli {
    /// Override config file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Mirror root URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory to store torrents in (a temporary directory when omitted)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip downloading if the torrent file is already present in the output directory
    #[arg(short, long)]
    pub skip_existing: bool,

    /// Archive extensions to look for (comma separated)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Architectures of binary branches (comma separated)
    #[arg(long, value_name = "ARCH", value_delimiter = ',')]
    pub architectures: Option<Vec<String>>,

    /// Platforms of binary branches (comma separated)
    #[arg(long, value_name = "PLATFORM", value_delimiter = ',')]
    pub platforms: Option<Vec<String>>,

    /// Branches laid out as <version>/<platform>/<arch> (comma separated)
    #[arg(long, value_name = "BRANCH", value_delimiter = ',')]
    pub binary_branches: Option<Vec<String>>,

    /// Branches laid out as <version> only (comma separated)
    #[arg(long, value_name = "BRANCH", value_delimiter = ',')]
    pub portable_branches: Option<Vec<String>>,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,
}

/// A lone empty value (`--platforms ''`) clears the list.
fn normalize(values: &[String]) -> Vec<String> {
    match values {
        [only] if only.is_empty() => Vec::new(),
        _ => values.to_vec(),
    }
}

impl Cli {
    /// Validate CLI arguments and show helpful error messages
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.base_url {
            if url.trim().is_empty() {
                return Err("Base URL cannot be empty".to_string());
            }
        }

        let lists = [
            ("extensions", &self.extensions),
            ("architectures", &self.architectures),
            ("platforms", &self.platforms),
            ("binary-branches", &self.binary_branches),
            ("portable-branches", &self.portable_branches),
        ];

        for (name, values) in lists {
            if let Some(values) = values {
                if normalize(values).iter().any(|v| v.trim().is_empty()) {
                    return Err(format!("--{} cannot contain empty entries", name));
                }
            }
        }

        Ok(())
    }

    /// Apply command line overrides on top of a loaded configuration
    pub fn apply_to(&self, config: &mut CrawlConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if self.skip_existing {
            config.skip_existing = true;
        }
        if let Some(values) = &self.extensions {
            config.extensions = normalize(values);
        }
        if let Some(values) = &self.architectures {
            config.architectures = normalize(values);
        }
        if let Some(values) = &self.platforms {
            config.platforms = normalize(values);
        }
        if let Some(values) = &self.binary_branches {
            config.binary_branches = normalize(values);
        }
        if let Some(values) = &self.portable_branches {
            config.portable_branches = normalize(values);
        }
    }
}
