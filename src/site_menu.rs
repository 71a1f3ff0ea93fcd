//! One-shot site menu
//!
//! The choice comes from the first command-line argument or, failing that,
//! one line of input. Anything unrecognized runs every site.

use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use crate::extractors::{report_all, Site};
use crate::fetch::Fetch;
use crate::menu::read_line;
use crate::present::{rule, Palette};

const RULE_WIDTH: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteChoice {
    One(Site),
    All,
}

impl SiteChoice {
    pub fn parse(input: &str) -> Option<Self> {
        Some(match input.trim() {
            "1" => SiteChoice::One(Site::ExampleCom),
            "2" => SiteChoice::One(Site::Quotes),
            "3" => SiteChoice::One(Site::Books),
            "4" => SiteChoice::One(Site::HackerNews),
            "5" => SiteChoice::All,
            _ => return None,
        })
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ran(SiteChoice),
    /// Unrecognized input; every site was run
    Fallback,
    /// Input ended before a choice was made
    NoChoice,
}

pub fn menu() -> String {
    let line = rule('=', RULE_WIDTH);
    format!(
        "{line}\nWEBSITE SCRAPER - Choose a site to scrape\n{line}\n\
         \n1. Example.com (simple HTML)\n\
         2. Quotes to Scrape (practice site)\n\
         3. Books to Scrape (practice site)\n\
         4. Hacker News (real site)\n\
         5. All of the above\n\
         \nEnter choice (1-5): \n"
    )
}

pub fn footer() -> String {
    let line = rule('=', RULE_WIDTH);
    format!("\n{line}\nDone! Try modifying the selectors to extract different data.\n{line}\n")
}

/// Show the menu, take one choice, scrape and print the footer
pub fn run_session<R: BufRead, W: Write>(
    choice_arg: Option<&str>,
    input: &mut R,
    output: &mut W,
    fetcher: &dyn Fetch,
    palette: &Palette,
) -> io::Result<Outcome> {
    output.write_all(menu().as_bytes())?;
    output.flush()?;

    let choice = match choice_arg {
        Some(arg) => arg.to_string(),
        None => match read_line(input) {
            Some(line) => line,
            None => {
                debug!("no choice given");
                return Ok(Outcome::NoChoice);
            }
        },
    };

    let outcome = match SiteChoice::parse(&choice) {
        Some(SiteChoice::One(site)) => {
            site.report(fetcher, palette, &mut *output)?;
            Outcome::Ran(SiteChoice::One(site))
        }
        Some(SiteChoice::All) => {
            report_all(fetcher, palette, &mut *output)?;
            Outcome::Ran(SiteChoice::All)
        }
        None => {
            info!(
                choice = choice.trim(),
                "unrecognized choice, running every site"
            );
            writeln!(output, "Invalid choice. Running all examples...")?;
            report_all(fetcher, palette, &mut *output)?;
            Outcome::Fallback
        }
    };

    output.write_all(footer().as_bytes())?;
    output.flush()?;
    Ok(outcome)
}
