//! Site extractors
//!
//! Item-based sites are described by a static [`Target`]: where to fetch,
//! which elements are items, and how each field is read from an item. The
//! same engine turns any target into a batch of [`Record`]s.

mod books;
mod hacker_news;
mod page;
mod quotes;

pub use books::*;
pub use hacker_news::*;
pub use page::*;
pub use quotes::*;

use std::io::{self, Write};

use scraper::ElementRef;
use tracing::{debug, warn};
use url::Url;

use crate::fetch::{Fetch, FetchError};
use crate::markup::{attr, select_all_in, select_first_in, text, HtmlDocument, MarkupError};
use crate::present::{render_record, rule, Layout, Palette, PLACEHOLDER};
use crate::record::Record;

/// Desktop browser string; the practice sites serve everyone, HN is pickier
pub const BROWSER_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
);

const BANNER_WIDTH: usize = 70;

/// Where a field's text comes from on the matched node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Text,
    Attr(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// First match or nothing
    First,
    /// Every match, joined with ", " (possibly empty)
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Last whitespace-separated token, e.g. `star-rating Three` -> `Three`
    LastToken,
    /// Resolve a relative link against this base URL
    Resolve(&'static str),
}

/// How one field is read from an item element
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    /// `None` reads the item element itself
    pub selector: Option<&'static str>,
    pub accessor: Accessor,
    pub cardinality: Cardinality,
    pub transforms: &'static [Transform],
    pub required: bool,
}

impl FieldRule {
    pub const fn text(field: &'static str, selector: Option<&'static str>) -> Self {
        Self {
            field,
            selector,
            accessor: Accessor::Text,
            cardinality: Cardinality::First,
            transforms: &[],
            required: true,
        }
    }

    pub const fn attr(
        field: &'static str,
        selector: Option<&'static str>,
        name: &'static str,
    ) -> Self {
        Self {
            accessor: Accessor::Attr(name),
            ..Self::text(field, selector)
        }
    }

    pub const fn all(self) -> Self {
        Self {
            cardinality: Cardinality::All,
            ..self
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    pub const fn with(self, transforms: &'static [Transform]) -> Self {
        Self { transforms, ..self }
    }
}

/// A statically configured, item-based scrape target
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub name: &'static str,
    pub url: &'static str,
    pub user_agent: &'static str,
    pub item_selector: &'static str,
    /// Items kept for display, counted from the first match
    pub limit: usize,
    pub fields: &'static [FieldRule],
}

/// A required field whose selector matched nothing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("item {item}: `{selector}` matched nothing for `{field}`")]
pub struct SelectorMiss {
    pub item: usize,
    pub field: &'static str,
    pub selector: &'static str,
}

/// Records extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemBatch {
    /// Items matched before the display cap
    pub found: usize,
    pub records: Vec<Record>,
    pub misses: Vec<SelectorMiss>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Markup(#[from] MarkupError),
}

/// Apply `target`'s rules to every kept item in `doc`
pub fn extract_items(doc: &HtmlDocument, target: &Target) -> Result<ItemBatch, MarkupError> {
    let items = doc.select_all(target.item_selector)?;
    let mut batch = ItemBatch {
        found: items.len(),
        ..ItemBatch::default()
    };

    for (i, item) in items.into_iter().take(target.limit).enumerate() {
        let mut record = Record::default();
        for rule in target.fields {
            match read_field(item, rule)? {
                Some(value) => record.set(rule.field, value),
                None if rule.required => {
                    let miss = SelectorMiss {
                        item: i + 1,
                        field: rule.field,
                        selector: rule.selector.unwrap_or(target.item_selector),
                    };
                    warn!(site = target.name, %miss, "required field missing");
                    record.set(rule.field, PLACEHOLDER.to_string());
                    batch.misses.push(miss);
                }
                None => {}
            }
        }
        batch.records.push(record);
    }

    debug!(
        site = target.name,
        found = batch.found,
        kept = batch.records.len(),
        "extracted items"
    );
    Ok(batch)
}

fn read_field(item: ElementRef<'_>, rule: &FieldRule) -> Result<Option<String>, MarkupError> {
    let nodes = match (rule.selector, rule.cardinality) {
        (None, _) => vec![item],
        (Some(selector), Cardinality::First) => {
            select_first_in(item, selector)?.into_iter().collect()
        }
        (Some(selector), Cardinality::All) => select_all_in(item, selector)?,
    };

    let mut values = nodes.into_iter().filter_map(|node| {
        let raw = match rule.accessor {
            Accessor::Text => text(node),
            Accessor::Attr(name) => attr(node, name)?.to_string(),
        };
        Some(apply_transforms(raw, rule.transforms))
    });

    Ok(match rule.cardinality {
        Cardinality::First => values.next(),
        Cardinality::All => Some(values.collect::<Vec<_>>().join(", ")),
    })
}

fn apply_transforms(mut value: String, transforms: &[Transform]) -> String {
    for transform in transforms {
        value = match transform {
            Transform::LastToken => value
                .split_whitespace()
                .last()
                .unwrap_or_default()
                .to_string(),
            Transform::Resolve(base) => resolve_link(base, &value),
        };
    }
    value
}

/// Absolute form of `href`; unparseable input comes back unchanged
pub fn resolve_link(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Batch header, numbered records, then any misses
pub fn render_batch(
    header: &str,
    batch: &ItemBatch,
    layout: &Layout,
    palette: &Palette,
) -> String {
    let mut out = format!("{header}\n\n");
    for (i, record) in batch.records.iter().enumerate() {
        out.push_str(&render_record(record, i + 1, layout, palette));
    }
    for miss in &batch.misses {
        out.push_str(&palette.error(&format!("  ! {miss}")));
        out.push('\n');
    }
    out
}

/// The four sites `site-scraper` knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    ExampleCom,
    Quotes,
    Books,
    HackerNews,
}

impl Site {
    pub const ALL: [Site; 4] = [Site::ExampleCom, Site::Quotes, Site::Books, Site::HackerNews];

    pub fn title(self) -> &'static str {
        match self {
            Site::ExampleCom => "Example.com",
            Site::Quotes => "Quotes to Scrape (http://quotes.toscrape.com)",
            Site::Books => "Books to Scrape (http://books.toscrape.com)",
            Site::HackerNews => "Hacker News (https://news.ycombinator.com)",
        }
    }

    fn target(self) -> Option<&'static Target> {
        match self {
            Site::ExampleCom => None,
            Site::Quotes => Some(&QUOTES),
            Site::Books => Some(&BOOKS),
            Site::HackerNews => Some(&HACKER_NEWS),
        }
    }

    pub fn url(self) -> &'static str {
        self.target().map_or(EXAMPLE_URL, |t| t.url)
    }

    /// Fetch, parse and render this site
    pub fn scrape(self, fetcher: &dyn Fetch, palette: &Palette) -> Result<String, ScrapeError> {
        let user_agent = self.target().map_or(BROWSER_USER_AGENT, |t| t.user_agent);
        let html = fetcher.fetch(self.url(), user_agent)?;
        let doc = HtmlDocument::parse(&html);

        Ok(match self {
            Site::ExampleCom => render_page(&extract_page(&doc)?, palette),
            Site::Quotes => render_quotes(&extract_items(&doc, &QUOTES)?, palette),
            Site::Books => render_books(&extract_items(&doc, &BOOKS)?, palette),
            Site::HackerNews => {
                render_hacker_news(&extract_items(&doc, &HACKER_NEWS)?, palette)
            }
        })
    }

    /// Banner, flushed before the request goes out, then the output; a
    /// failure becomes a printed error line
    pub fn report(
        self,
        fetcher: &dyn Fetch,
        palette: &Palette,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        out.write_all(banner(&format!("Scraping {}", self.title())).as_bytes())?;
        out.flush()?;

        match self.scrape(fetcher, palette) {
            Ok(body) => out.write_all(body.as_bytes())?,
            Err(e) => {
                warn!(site = ?self, error = %e, "scrape failed");
                writeln!(out, "{}", palette.error(&format!("Error: {e}")))?;
            }
        }
        out.flush()
    }
}

/// Report every site in order; one failing site never stops the rest
pub fn report_all(fetcher: &dyn Fetch, palette: &Palette, out: &mut dyn Write) -> io::Result<()> {
    for site in Site::ALL {
        site.report(fetcher, palette, out)?;
    }
    Ok(())
}

pub fn banner(title: &str) -> String {
    let line = rule('=', BANNER_WIDTH);
    format!("\n{line}\n{title}\n{line}\n")
}
