//! Settings shared by both binaries
//!
//! Every flag can also come from the environment; the command line wins.

use std::time::Duration;

use clap::{Args, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::fetch::HttpFetcher;
use crate::menu::DEFAULT_PAUSE;
use crate::present::{colors_disabled_by_env, Palette};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal and NO_COLOR is unset
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Send this User-Agent on every request instead of the per-site one.
    #[arg(long, env = "MARKUP_SCRAPE_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "MARKUP_SCRAPE_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// When to use ANSI colors.
    #[arg(long, env = "MARKUP_SCRAPE_COLOR", value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Pause after an invalid menu choice, in milliseconds.
    #[arg(long, env = "MARKUP_SCRAPE_PAUSE_MS", default_value_t = DEFAULT_PAUSE.as_millis() as u64)]
    pub pause_ms: u64,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub user_agent: Option<String>,
    pub timeout: Duration,
    pub color: ColorMode,
    pub pause: Duration,
    pub log_level: String,
}

impl From<CommonArgs> for Settings {
    fn from(args: CommonArgs) -> Self {
        Self {
            user_agent: args.user_agent.filter(|ua| !ua.trim().is_empty()),
            timeout: Duration::from_secs(args.timeout_secs),
            color: args.color,
            pause: Duration::from_millis(args.pause_ms),
            log_level: args.log_level,
        }
    }
}

impl Settings {
    pub fn fetcher(&self) -> HttpFetcher {
        HttpFetcher::new(self.timeout).with_user_agent(self.user_agent.clone())
    }

    pub fn palette(&self) -> Palette {
        match self.color {
            ColorMode::Auto => Palette::detect(),
            // NO_COLOR still wins over an explicit request
            ColorMode::Always => Palette::new(!colors_disabled_by_env()),
            ColorMode::Never => Palette::plain(),
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides `level`
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
