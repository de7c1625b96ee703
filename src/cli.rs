//! Command-line interface definitions for Storefront Harvest.
//!
//! Global options may also come from environment variables, which override the
//! YAML config file.

use clap::{Args, Parser, Subcommand, ValueEnum};
use storefront_harvest::config::CollectorConfig;
use storefront_harvest::models::{SortKey, SortOrder};

/// Classify commerce and news URLs, then fetch and extract records from them.
///
/// # Examples
///
/// ```sh
/// # Review a pasted list of links before collecting
/// storefront-harvest parse links.txt
///
/// # Collect one article
/// storefront-harvest article https://www.thepaper.cn/newsDetail_forward_123
///
/// # Collect a whole list, writing results under ./out/<date>/
/// storefront-harvest -o ./out collect links.txt --force
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "HARVEST_CONFIG")]
    pub config: Option<String>,

    /// Also write results as JSON under <OUTPUT_DIR>/<date>/
    #[arg(short, long, global = true, env = "HARVEST_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "HARVEST_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Minimum delay between requests to the same site, in milliseconds
    #[arg(long, global = true, env = "HARVEST_REQUEST_DELAY_MS")]
    pub request_delay_ms: Option<u64>,

    /// Maximum items read from one feed
    #[arg(long, global = true, env = "HARVEST_MAX_FEED_ITEMS")]
    pub max_feed_items: Option<usize>,

    /// User-Agent header sent with every request
    #[arg(long, global = true, env = "HARVEST_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Task id stamped on collected records (generated when omitted)
    #[arg(long, global = true)]
    pub task_id: Option<String>,
}

impl GlobalOpts {
    /// Apply command-line and environment overrides on top of `config`.
    pub fn apply(&self, mut config: CollectorConfig) -> CollectorConfig {
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(ms) = self.request_delay_ms {
            config.request_delay_ms = ms;
        }
        if let Some(n) = self.max_feed_items {
            config.max_feed_items = n;
        }
        if let Some(ua) = &self.user_agent {
            config.user_agent = ua.clone();
        }
        config.sanitized()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify every line of a link list and print the review report
    Parse {
        /// File with one URL per line, or `-` for stdin
        input: String,
    },

    /// Collect a single news article
    Article { url: String },

    /// Collect a single product page
    Product { url: String },

    /// Collect every item of an RSS or Atom feed
    Feed {
        url: String,

        /// Order items before printing
        #[arg(long, value_enum)]
        sort: Option<SortBy>,

        /// Sort ascending instead of newest/largest first
        #[arg(long, requires = "sort")]
        asc: bool,
    },

    /// Pre-flight check a link list, then collect every valid entry
    Collect {
        /// File with one URL per line, or `-` for stdin
        input: String,

        /// Start even when some entries have low detection confidence
        #[arg(long)]
        force: bool,

        /// Disable per-site request spacing
        #[arg(long)]
        no_throttle: bool,
    },

    /// List the enabled built-in sources
    Sources,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Published,
    Collected,
    Title,
}

impl SortBy {
    pub fn key(self) -> SortKey {
        match self {
            SortBy::Published => SortKey::PublishedAt,
            SortBy::Collected => SortKey::CollectedAt,
            SortBy::Title => SortKey::Title,
        }
    }
}

pub fn sort_order(asc: bool) -> SortOrder {
    if asc { SortOrder::Asc } else { SortOrder::Desc }
}
