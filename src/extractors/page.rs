//! Whole-page overview: title, heading, paragraphs, links

use tracing::warn;

use crate::markup::{attr, text, HtmlDocument, MarkupError};
use crate::present::{truncate, Palette, PLACEHOLDER};
use crate::record::Record;

pub const EXAMPLE_URL: &str = "https://example.com";

/// Paragraph preview width
pub const PARAGRAPH_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOverview {
    pub title: String,
    pub heading: Option<String>,
    pub paragraphs: Vec<String>,
    /// `text` and, when present, `href`
    pub links: Vec<Record>,
}

pub fn extract_page(doc: &HtmlDocument) -> Result<PageOverview, MarkupError> {
    let title = match doc.select_first("title")? {
        Some(el) => text(el),
        None => {
            warn!(selector = "title", "page has no title");
            PLACEHOLDER.to_string()
        }
    };
    let heading = doc.select_first("h1")?.map(text);
    let paragraphs = doc.select_all("p")?.into_iter().map(text).collect();

    let links = doc
        .select_all("a")?
        .into_iter()
        .map(|a| {
            let mut link = Record::default();
            link.set("text", text(a));
            if let Some(href) = attr(a, "href") {
                link.set("href", href.to_string());
            }
            link
        })
        .collect();

    Ok(PageOverview {
        title,
        heading,
        paragraphs,
        links,
    })
}

pub fn render_page(page: &PageOverview, palette: &Palette) -> String {
    let mut out = format!("Page Title: {}\n", palette.emphasis(&page.title));
    if let Some(heading) = &page.heading {
        out.push_str(&format!("Main Heading: {heading}\n"));
    }

    out.push_str(&format!("\nParagraphs found: {}\n", page.paragraphs.len()));
    for (i, p) in page.paragraphs.iter().enumerate() {
        out.push_str(&format!("  P{}: {}\n", i + 1, truncate(p, PARAGRAPH_WIDTH)));
    }

    out.push_str(&format!("\nLinks found: {}\n", page.links.len()));
    for link in &page.links {
        out.push_str(&format!(
            "  - {}: {}\n",
            link.get("text").unwrap_or_default(),
            link.get("href").unwrap_or(PLACEHOLDER)
        ));
    }
    out
}
