//! site-scraper: pick a site, scrape it, print what was found

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use markup_scrape::config::{init_logging, CommonArgs, Settings};
use markup_scrape::site_menu::run_session;

#[derive(Parser)]
#[command(
    name = "site-scraper",
    about = "Scrape example.com, quotes/books.toscrape.com or Hacker News",
    version
)]
struct Cli {
    /// Menu choice (1-5); read from stdin when omitted.
    choice: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::from(cli.common);
    init_logging(&settings.log_level);

    let fetcher = settings.fetcher();
    let palette = settings.palette();
    let mut stdout = BufWriter::new(io::stdout());

    let result = run_session(
        cli.choice.as_deref(),
        &mut io::stdin().lock(),
        &mut stdout,
        &fetcher,
        &palette,
    )
    .and_then(|_| stdout.flush());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "could not write to stdout");
            ExitCode::FAILURE
        }
    }
}
