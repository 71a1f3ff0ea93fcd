//! Guided tour of the markup layer
//!
//! Ten lessons over a fixed sample page, a small bookstore XML document, a
//! generated page and one live Hacker News fetch. Lessons write straight to
//! the output; only lesson 6 touches the network, through [`Fetch`], and it
//! flushes its announcement before the request goes out.

use std::io::{self, Write};
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::extractors::{extract_items, HACKER_NEWS_TOUR};
use crate::fetch::Fetch;
use crate::markup::{
    attr, attribute_names, child_node_count, element_children, inner_markup,
    next_element_sibling, parent_element, render_document, tag_name, text, ElementBuilder,
    HtmlDocument, MarkupError, XmlDocument,
};
use crate::menu::Program;
use crate::present::{rule, truncate, Palette, PLACEHOLDER};
use crate::record::Record;

pub const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head><title>My Page</title></head>
  <body>
    <h1 id="main-heading">Welcome</h1>
    <div class="content">
      <p class="intro">This is a paragraph.</p>
      <p class="highlight">Important text here!</p>
      <ul id="my-list">
        <li>Item 1</li>
        <li>Item 2</li>
        <li>Item 3</li>
      </ul>
    </div>
  </body>
</html>
"#;

pub const BOOKSTORE_XML: &str = r#"<?xml version="1.0"?>
<bookstore>
  <book category="fiction">
    <title>Harry Potter</title>
    <author>J.K. Rowling</author>
    <price>29.99</price>
  </book>
  <book category="tech">
    <title>Ruby Programming</title>
    <author>David Flanagan</author>
    <price>39.99</price>
  </book>
</bookstore>
"#;

const INNER_MARKUP_WIDTH: usize = 50;
const BUILT_PREVIEW_WIDTH: usize = 200;
const FRAME_WIDTH: usize = 66;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lesson {
    Parsing,
    CssSelectors,
    XPathSelectors,
    Traversal,
    Attributes,
    LiveScrape,
    TextExtraction,
    Patterns,
    Building,
    Xml,
}

impl Lesson {
    pub const ALL: [Lesson; 10] = [
        Lesson::Parsing,
        Lesson::CssSelectors,
        Lesson::XPathSelectors,
        Lesson::Traversal,
        Lesson::Attributes,
        Lesson::LiveScrape,
        Lesson::TextExtraction,
        Lesson::Patterns,
        Lesson::Building,
        Lesson::Xml,
    ];

    /// 1-based menu number
    pub fn number(self) -> usize {
        self as usize + 1
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            Lesson::Parsing => "Parsing HTML String",
            Lesson::CssSelectors => "CSS Selectors",
            Lesson::XPathSelectors => "XPath Selectors",
            Lesson::Traversal => "DOM Traversal",
            Lesson::Attributes => "Extracting Attributes",
            Lesson::LiveScrape => "Scraping Real Website (Hacker News)",
            Lesson::TextExtraction => "Text Extraction",
            Lesson::Patterns => "Searching with Patterns",
            Lesson::Building => "Building HTML",
            Lesson::Xml => "Parsing XML",
        }
    }

    fn heading(self) -> &'static str {
        match self {
            Lesson::Parsing => "Parsing HTML String - The Foundation",
            Lesson::CssSelectors => "CSS Selectors - Targeting Elements",
            Lesson::XPathSelectors => "XPath Selectors - Advanced Navigation",
            Lesson::Traversal => "DOM Traversal - Navigating the Tree",
            Lesson::Attributes => "Extracting Attributes - Accessing Element Data",
            Lesson::LiveScrape => "Scraping Real Website - Hacker News",
            Lesson::TextExtraction => "Text Extraction - Getting Content",
            Lesson::Patterns => "Searching with Patterns - Text Matching",
            Lesson::Building => "Building HTML - Creating Documents",
            Lesson::Xml => "Parsing XML - Working with XML Documents",
        }
    }

    /// Header plus lesson body; a markup failure is shown in place of the body
    pub fn run(
        self,
        fetcher: &dyn Fetch,
        palette: &Palette,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let line = palette.info(&rule('━', FRAME_WIDTH + 2));
        write!(
            out,
            "\n{line}\n{}\n{line}\n",
            palette.heading(&format!("[{}] {}", self.number(), self.heading()))
        )?;

        let body = match self {
            Lesson::Parsing => parsing(palette),
            Lesson::CssSelectors => css_selectors(palette),
            Lesson::XPathSelectors => xpath_selectors(palette),
            Lesson::Traversal => traversal(palette),
            Lesson::Attributes => attributes(palette),
            Lesson::LiveScrape => return live_scrape(fetcher, palette, out),
            Lesson::TextExtraction => text_extraction(palette),
            Lesson::Patterns => patterns(palette),
            Lesson::Building => Ok(building(palette)),
            Lesson::Xml => xml(palette),
        };

        match body {
            Ok(body) => out.write_all(body.as_bytes()),
            Err(e) => {
                warn!(lesson = self.number(), error = %e, "lesson failed");
                writeln!(out, "{}", palette.error(&format!("Error: {e}")))
            }
        }
    }
}

fn sample() -> HtmlDocument {
    HtmlDocument::parse(SAMPLE_HTML)
}

/// Text of the first match, or the placeholder
fn first_text(doc: &HtmlDocument, selector: &str) -> Result<String, MarkupError> {
    Ok(doc
        .select_first(selector)?
        .map(text)
        .unwrap_or_else(|| PLACEHOLDER.to_string()))
}

fn parsing(palette: &Palette) -> Result<String, MarkupError> {
    let doc = sample();
    Ok(format!(
        "{}\n\nTitle: {}\nH1 content: {}\nFirst paragraph: {}\n",
        palette.accent("\nDocument parsed successfully! Now extracting content..."),
        palette.emphasis(&first_text(&doc, "title")?),
        palette.emphasis(&first_text(&doc, "h1")?),
        palette.emphasis(&first_text(&doc, "p")?),
    ))
}

fn css_selectors(palette: &Palette) -> Result<String, MarkupError> {
    let doc = sample();
    let mut out = format!(
        "\nBy ID (#main-heading): {}\nBy class (.intro): {}\n",
        palette.accent(&first_text(&doc, "#main-heading")?),
        palette.accent(&first_text(&doc, ".intro")?),
    );

    let paragraphs = doc.select_all("p")?;
    out.push_str(&format!(
        "\nAll <p> tags: {}\n",
        palette.count(&format!("{} found", paragraphs.len()))
    ));
    for (i, p) in paragraphs.into_iter().enumerate() {
        out.push_str(&format!("   {}. {}\n", i + 1, text(p)));
    }

    let items: Vec<String> = doc
        .select_all("#my-list li")?
        .into_iter()
        .map(text)
        .collect();
    out.push_str(&format!("\nList items: {}\n", palette.accent(&items.join(", "))));
    Ok(out)
}

fn xpath_selectors(palette: &Palette) -> Result<String, MarkupError> {
    let doc = sample();
    let title: String = doc.xpath("//title")?.into_iter().map(text).collect();
    let highlighted = doc
        .xpath(r#"//p[@class="highlight"]"#)?
        .into_iter()
        .next()
        .map(text)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    Ok(format!(
        "\nTitle via XPath: {}\nHighlighted paragraphs: {}\n",
        palette.accent(&title),
        palette.heading(&highlighted),
    ))
}

fn traversal(palette: &Palette) -> Result<String, MarkupError> {
    let doc = sample();
    let mut out = String::from("\n");

    if let Some(div) = doc.select_first(".content")? {
        let parent = parent_element(div).map(tag_name).unwrap_or(PLACEHOLDER);
        out.push_str(&format!(
            "Parent: {}\nChildren count: {}\nElement children: {}\n",
            palette.accent(&format!("<{parent}>")),
            palette.count(&child_node_count(div).to_string()),
            palette.count(&element_children(div).len().to_string()),
        ));
    }

    let sibling = doc
        .select_first("p")?
        .and_then(next_element_sibling)
        .map(text)
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    out.push_str(&format!("Next sibling: {}\n", palette.accent(&sibling)));
    Ok(out)
}

fn attributes(palette: &Palette) -> Result<String, MarkupError> {
    let doc = sample();
    let mut out = String::from("\n");

    if let Some(h1) = doc.select_first("h1")? {
        out.push_str(&format!(
            "H1 id attribute: {}\nH1 attributes: {}\n",
            palette.accent(attr(h1, "id").unwrap_or(PLACEHOLDER)),
            palette.heading(&attribute_names(h1).join(", ")),
        ));
    }
    if let Some(ul) = doc.select_first("ul")? {
        out.push_str(&format!(
            "UL id: {}\n",
            palette.accent(attr(ul, "id").unwrap_or(PLACEHOLDER))
        ));
    }
    Ok(out)
}

fn live_scrape(fetcher: &dyn Fetch, palette: &Palette, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        palette.accent("\nFetching live data from the internet...")
    )?;
    out.flush()?;

    let target = &HACKER_NEWS_TOUR;

    let batch = fetcher
        .fetch(target.url, target.user_agent)
        .map_err(|e| e.to_string())
        .and_then(|html| {
            extract_items(&HtmlDocument::parse(&html), target).map_err(|e| e.to_string())
        });

    match batch {
        Ok(batch) => {
            let header = format!("\nTop {} Stories:", batch.records.len());
            write!(out, "{}\n\n", palette.info(&header))?;
            for (i, story) in batch.records.iter().enumerate() {
                write!(
                    out,
                    "{}{}\n     Link: {}\n\n",
                    palette.bold(&format!("  {}. ", i + 1)),
                    palette.count(story.get("title").unwrap_or(PLACEHOLDER)),
                    palette.accent(story.get("link").unwrap_or(PLACEHOLDER)),
                )?;
            }
            Ok(())
        }
        Err(e) => {
            warn!(site = target.name, error = %e, "live lesson failed");
            let message = format!("Error fetching Hacker News: {e}");
            writeln!(out, "{}", palette.error(&message))
        }
    }
}

fn text_extraction(palette: &Palette) -> Result<String, MarkupError> {
    let doc = sample();
    let Some(div) = doc.select_first(".content")? else {
        return Ok(String::new());
    };
    Ok(format!(
        "\nInner text: {}\nInner HTML preview: {}\n",
        palette.accent(&squash(&text(div))),
        palette.heading(&truncate(&squash(&inner_markup(div)), INNER_MARKUP_WIDTH)),
    ))
}

/// Collapse whitespace runs so a preview fits on one line
fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn important_pattern() -> Option<&'static Regex> {
    static IMPORTANT: OnceLock<Option<Regex>> = OnceLock::new();
    IMPORTANT
        .get_or_init(|| Regex::new("(?i)important").ok())
        .as_ref()
}

fn patterns(palette: &Palette) -> Result<String, MarkupError> {
    let doc = sample();
    let mut out = String::from("\nSearching for the word 'important'...\n");
    for p in doc.select_all("p")? {
        let content = text(p);
        if important_pattern().is_some_and(|re| re.is_match(&content)) {
            out.push_str(&format!("Found: {}\n", palette.accent(&content)));
        }
    }
    Ok(out)
}

/// The page lesson 9 builds
pub fn generated_page() -> String {
    let page = ElementBuilder::new("html")
        .child(
            ElementBuilder::new("head")
                .child(ElementBuilder::new("title").text("Generated Page")),
        )
        .child(
            ElementBuilder::new("body")
                .child(
                    ElementBuilder::new("h1")
                        .attr("class", "main")
                        .text("Generated Heading"),
                )
                .child(ElementBuilder::new("p").text("This was created with ElementBuilder"))
                .child(
                    ElementBuilder::new("ul").children(
                        ["Rust", "Python", "JavaScript"]
                            .into_iter()
                            .map(|lang| ElementBuilder::new("li").text(lang)),
                    ),
                ),
        );
    render_document(&page)
}

fn building(palette: &Palette) -> String {
    format!(
        "\nGenerated HTML preview:\n{}\n",
        palette.heading(&truncate(&generated_page(), BUILT_PREVIEW_WIDTH))
    )
}

/// One record per `<book>`: title, author, price, category
pub fn bookstore_records(xml: &str) -> Result<Vec<Record>, MarkupError> {
    let doc = XmlDocument::parse(xml)?;
    doc.xpath("//book")?
        .into_iter()
        .map(|book| -> Result<Record, MarkupError> {
            let child = |name: &str| -> Result<String, MarkupError> {
                Ok(book
                    .at_xpath(name)?
                    .map(|el| el.text())
                    .unwrap_or_else(|| PLACEHOLDER.to_string()))
            };
            Ok([
                ("title", child("title")?),
                ("author", child("author")?),
                ("price", child("price")?),
                (
                    "category",
                    book.attr("category").unwrap_or(PLACEHOLDER).to_string(),
                ),
            ]
            .into_iter()
            .collect())
        })
        .collect()
}

fn xml(palette: &Palette) -> Result<String, MarkupError> {
    let books = bookstore_records(BOOKSTORE_XML)?;
    let mut out = format!(
        "\nBooks found: {}\n\n",
        palette.count(&books.len().to_string())
    );
    for book in &books {
        let field = |name: &str| book.get(name).unwrap_or(PLACEHOLDER);
        out.push_str(&format!(
            "  {}{}\n     Price: ${} | Category: {}\n\n",
            palette.bold(field("title")),
            palette.accent(&format!(" by {}", field("author"))),
            field("price"),
            field("category"),
        ));
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourChoice {
    Lesson(Lesson),
    All,
    Exit,
}

impl TourChoice {
    /// Exact menu keys only: `"03"` or `"+3"` are not choices
    pub fn parse(input: &str) -> Option<Self> {
        let lesson = match input.trim() {
            "0" => return Some(TourChoice::Exit),
            "11" => return Some(TourChoice::All),
            "1" => Lesson::Parsing,
            "2" => Lesson::CssSelectors,
            "3" => Lesson::XPathSelectors,
            "4" => Lesson::Traversal,
            "5" => Lesson::Attributes,
            "6" => Lesson::LiveScrape,
            "7" => Lesson::TextExtraction,
            "8" => Lesson::Patterns,
            "9" => Lesson::Building,
            "10" => Lesson::Xml,
            _ => return None,
        };
        Some(TourChoice::Lesson(lesson))
    }
}

/// The tour as a menu program
pub struct Tour<'a> {
    fetcher: &'a dyn Fetch,
}

impl<'a> Tour<'a> {
    pub fn new(fetcher: &'a dyn Fetch) -> Self {
        Self { fetcher }
    }

    /// Every lesson in order, then the completion line
    pub fn run_all(&self, palette: &Palette, out: &mut dyn Write) -> io::Result<()> {
        for lesson in Lesson::ALL {
            lesson.run(self.fetcher, palette, out)?;
        }
        writeln!(out, "{}", palette.info(&rule('━', FRAME_WIDTH + 2)))?;
        writeln!(
            out,
            "{}",
            palette.accent("\nAll examples completed successfully.\n")
        )
    }
}

/// `║ text ║` with the text padded to the frame width
fn framed(palette: &Palette, text: &str, style: fn(&Palette, &str) -> String) -> String {
    let pad = FRAME_WIDTH.saturating_sub(text.chars().count());
    format!(
        "{}{}{}{}\n",
        palette.accent("║"),
        style(palette, text),
        " ".repeat(pad),
        palette.accent("║")
    )
}

fn centered(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let left = width.saturating_sub(len) / 2;
    format!("{}{text}", " ".repeat(left))
}

fn menu_entry(
    palette: &Palette,
    key: &str,
    label: &str,
    color: fn(&Palette, &str) -> String,
) -> String {
    const INNER: usize = 60;
    let body = format!("    {key:>3} {label}");
    let pad = INNER.saturating_sub(body.chars().count());
    format!(
        "  {}    {} {label}{}{}\n",
        palette.frame("│"),
        color(palette, &format!("{key:>3}")),
        " ".repeat(pad),
        palette.frame("│")
    )
}

impl Program for Tour<'_> {
    type Choice = TourChoice;

    fn menu(&self, palette: &Palette) -> String {
        let top = rule('═', FRAME_WIDTH);
        let line = rule('─', 60);
        let blank = format!(
            "  {}{}{}\n",
            palette.frame("│"),
            " ".repeat(60),
            palette.frame("│")
        );

        let mut out = String::from("\n");
        out.push_str(&palette.accent(&format!("╔{top}╗")));
        out.push('\n');
        out.push_str(&framed(
            palette,
            &centered("MARKUP SCRAPE INTERACTIVE EXAMPLES", FRAME_WIDTH),
            Palette::bold,
        ));
        out.push_str(&framed(
            palette,
            &centered("Choose an example to run", FRAME_WIDTH),
            |_, t| t.to_string(),
        ));
        out.push_str(&palette.accent(&format!("╚{top}╝")));
        out.push_str("\n\n");

        out.push_str(&palette.frame(&format!("  ┌{line}┐")));
        out.push('\n');
        out.push_str(&format!(
            "  {}{:<60}{}\n",
            palette.frame("│"),
            "  MAIN MENU - Available Examples:",
            palette.frame("│")
        ));
        out.push_str(&palette.frame(&format!("  ├{line}┤")));
        out.push('\n');
        out.push_str(&blank);
        for lesson in Lesson::ALL {
            out.push_str(&menu_entry(
                palette,
                &format!("{})", lesson.number()),
                lesson.label(),
                Palette::info,
            ));
        }
        out.push_str(&blank);
        out.push_str(&menu_entry(
            palette,
            "11)",
            "Run ALL Examples (Full Tutorial)",
            Palette::heading,
        ));
        out.push_str(&menu_entry(palette, "0)", "Exit", Palette::error));
        out.push_str(&blank);
        out.push_str(&palette.frame(&format!("  └{line}┘")));
        out.push_str("\n\n");
        out.push_str(&palette.accent("  Enter your choice (0-11): "));
        out
    }

    fn parse_choice(&self, line: &str) -> Option<TourChoice> {
        TourChoice::parse(line)
    }

    fn is_exit(&self, choice: TourChoice) -> bool {
        choice == TourChoice::Exit
    }

    fn run(&self, choice: TourChoice, palette: &Palette, out: &mut dyn Write) -> io::Result<()> {
        match choice {
            TourChoice::Lesson(lesson) => lesson.run(self.fetcher, palette, out),
            TourChoice::All => self.run_all(palette, out),
            TourChoice::Exit => Ok(()),
        }
    }

    fn invalid_message(&self, palette: &Palette) -> String {
        format!(
            "{}\n",
            palette.error("\nInvalid choice! Please enter a number between 0 and 11.\n")
        )
    }

    fn farewell(&self, palette: &Palette) -> String {
        let top = rule('═', FRAME_WIDTH);
        format!(
            "\n{}\n{}{}\n\n",
            palette.accent(&format!("╔{top}╗")),
            framed(
                palette,
                &centered("Thank you for using the markup tour!", FRAME_WIDTH),
                Palette::bold,
            ),
            palette.accent(&format!("╚{top}╝")),
        )
    }
}
