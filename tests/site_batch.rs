use std::cell::RefCell;
use std::io::{self, BufWriter, Write};

use markup_scrape::extractors::{report_all, Site, BOOKS, EXAMPLE_URL, QUOTES};
use markup_scrape::fetch::{Fetch, FetchError};
use markup_scrape::present::Palette;
use markup_scrape::site_menu::{run_session, Outcome, SiteChoice};

const EXAMPLE_PAGE: &str = r#"<html><head><title>Example Domain</title></head>
<body><h1>Example Domain</h1><p>Short.</p>
<p><a href="https://www.iana.org/domains/example">More information...</a></p></body></html>"#;

const QUOTES_PAGE: &str = r#"<div class="quote"><span class="text">“A quote.”</span>
<small class="author">Someone</small><div class="tags"><a class="tag">wit</a></div></div>"#;

const HN_PAGE: &str = r#"<span class="titleline"><a href="item?id=1">First story</a></span>"#;

/// Serves canned pages; books.toscrape.com is unreachable
#[derive(Default)]
struct Sandbox {
    requested: RefCell<Vec<String>>,
}

impl Fetch for Sandbox {
    fn fetch(&self, url: &str, _user_agent: &str) -> Result<String, FetchError> {
        self.requested.borrow_mut().push(url.to_string());
        match url {
            u if u == EXAMPLE_URL => Ok(EXAMPLE_PAGE.to_string()),
            u if u == QUOTES.url => Ok(QUOTES_PAGE.to_string()),
            u if u == BOOKS.url => Err(FetchError::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
            _ => Ok(HN_PAGE.to_string()),
        }
    }
}

/// Output shared with [`Watching`]; only flushed bytes reach it
struct Shared<'a>(&'a RefCell<Vec<u8>>);

impl Write for Shared<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Notes, per request, what the user could already see
struct Watching<'a> {
    output: &'a RefCell<Vec<u8>>,
    seen: RefCell<Vec<(String, String)>>,
}

impl Fetch for Watching<'_> {
    fn fetch(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let flushed = String::from_utf8_lossy(&self.output.borrow()).into_owned();
        self.seen.borrow_mut().push((url.to_string(), flushed));
        Sandbox::default().fetch(url, user_agent)
    }
}

fn report_to_string(fetcher: &dyn Fetch) -> String {
    let mut out = Vec::new();
    report_all(fetcher, &Palette::plain(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn session(arg: Option<&str>, stdin: &str) -> (Outcome, String, Vec<String>) {
    let sandbox = Sandbox::default();
    let mut input = stdin.as_bytes();
    let mut output = Vec::new();
    let outcome =
        run_session(arg, &mut input, &mut output, &sandbox, &Palette::plain()).unwrap();
    (
        outcome,
        String::from_utf8(output).unwrap(),
        sandbox.requested.into_inner(),
    )
}

#[test]
fn test_failing_site_does_not_stop_batch() {
    let out = report_to_string(&Sandbox::default());

    assert!(out.contains("Page Title: Example Domain\n"));
    assert!(out.contains("Found 1 quotes:\n\n1. “A quote.”\n   - Someone\n   - Tags: wit\n"));
    assert!(out.contains("Scraping Books to Scrape (http://books.toscrape.com)\n"));
    assert!(out.contains(
        "Error: network error fetching http://books.toscrape.com/: connection refused\n"
    ));
    assert!(out.contains(
        "Top 1 stories:\n\n1. First story\n   https://news.ycombinator.com/item?id=1\n"
    ));
}

#[test]
fn test_banner_is_visible_before_each_fetch() {
    let output = RefCell::new(Vec::new());
    let watching = Watching {
        output: &output,
        seen: RefCell::new(Vec::new()),
    };

    let mut stdout = BufWriter::new(Shared(&output));
    let outcome = run_session(
        Some("5"),
        &mut "".as_bytes(),
        &mut stdout,
        &watching,
        &Palette::plain(),
    )
    .unwrap();
    drop(stdout);
    assert_eq!(outcome, Outcome::Ran(SiteChoice::All));

    let seen = watching.seen.into_inner();
    assert_eq!(seen.len(), Site::ALL.len());
    for ((url, flushed), site) in seen.iter().zip(Site::ALL) {
        assert_eq!(url, site.url());
        assert!(flushed.starts_with("======"), "menu not flushed");
        let banner = format!("Scraping {}\n", site.title());
        assert!(flushed.ends_with(&format!("{banner}{}\n", "=".repeat(70))));
    }

    // earlier sites are fully printed by the time the next one is requested
    assert!(seen[3].1.contains("Error: network error fetching http://books.toscrape.com/"));
}

#[test]
fn test_argument_wins_over_stdin() {
    let (outcome, out, requested) = session(Some("2"), "4\n");

    assert_eq!(outcome, Outcome::Ran(SiteChoice::One(Site::Quotes)));
    assert_eq!(requested, [QUOTES.url]);
    assert!(out.ends_with(&format!(
        "Done! Try modifying the selectors to extract different data.\n{}\n",
        "=".repeat(70)
    )));
}

#[test]
fn test_choice_from_stdin() {
    let (outcome, _, requested) = session(None, "1\n");
    assert_eq!(outcome, Outcome::Ran(SiteChoice::One(Site::ExampleCom)));
    assert_eq!(requested, [EXAMPLE_URL]);
}

#[test]
fn test_invalid_choice_runs_everything() {
    let (outcome, out, requested) = session(Some("banana"), "");

    assert_eq!(outcome, Outcome::Fallback);
    assert!(out.contains("Invalid choice. Running all examples...\n"));
    assert_eq!(requested.len(), 4);
}

#[test]
fn test_end_of_input_scrapes_nothing() {
    let (outcome, out, requested) = session(None, "");

    assert_eq!(outcome, Outcome::NoChoice);
    assert!(requested.is_empty());
    assert!(!out.contains("Done!"));
}
