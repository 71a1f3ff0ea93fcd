//! HTML/XML parsing tour and small website scraper
//!
//! Library behind two interactive programs:
//! - `markup-tour`: ten lessons on parsing, selectors, XPath, traversal,
//!   building HTML and reading XML
//! - `site-scraper`: fetches example.com, two scraping sandboxes and the
//!   Hacker News front page and prints what it finds
//!
//! Parsing goes through `scraper` (HTML) and `quick-xml` (XML); fetching is
//! a single blocking `reqwest` call per page.

pub mod config;
pub mod extractors;
pub mod fetch;
pub mod markup;
pub mod menu;
pub mod present;
pub mod record;
pub mod site_menu;
pub mod tour;

pub use extractors::{Site, Target};
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use record::Record;
