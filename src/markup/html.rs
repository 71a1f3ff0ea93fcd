//! CSS selector-based queries over HTML
//!
//! Uses the scraper crate to parse documents and select elements. Selector
//! strings are parsed per call; a bad selector is an error, zero matches is
//! not.

use scraper::{ElementRef, Html, Selector};

use super::{MarkupError, XPath};

/// A parsed HTML document
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// The `<html>` element
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// First element matching `selector`, if any
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>, MarkupError> {
        let selector = compile(selector)?;
        Ok(self.html.select(&selector).next())
    }

    /// Every element matching `selector`, in document order
    pub fn select_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, MarkupError> {
        let selector = compile(selector)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Elements matching an XPath expression
    ///
    /// The expression is translated to CSS, so relative paths behave like
    /// absolute descendant searches.
    pub fn xpath(&self, expr: &str) -> Result<Vec<ElementRef<'_>>, MarkupError> {
        let css = XPath::parse(expr)?.to_css();
        self.select_all(&css)
    }
}

/// First descendant of `scope` matching `selector`
pub fn select_first_in<'a>(
    scope: ElementRef<'a>,
    selector: &str,
) -> Result<Option<ElementRef<'a>>, MarkupError> {
    let selector = compile(selector)?;
    Ok(scope.select(&selector).next())
}

/// Every descendant of `scope` matching `selector`
pub fn select_all_in<'a>(
    scope: ElementRef<'a>,
    selector: &str,
) -> Result<Vec<ElementRef<'a>>, MarkupError> {
    let selector = compile(selector)?;
    Ok(scope.select(&selector).collect())
}

/// Concatenated text of the element and its descendants, trimmed
pub fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

/// Attribute names in source order
pub fn attribute_names<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    element.value().attrs().map(|(name, _)| name).collect()
}

pub fn inner_markup(element: ElementRef<'_>) -> String {
    element.inner_html()
}

pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Number of child nodes of any kind, whitespace text included
pub fn child_node_count(element: ElementRef<'_>) -> usize {
    element.children().count()
}

pub fn element_children(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap).collect()
}

pub fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

pub fn tag_name<'a>(element: ElementRef<'a>) -> &'a str {
    element.value().name()
}

fn compile(selector: &str) -> Result<Selector, MarkupError> {
    Selector::parse(selector).map_err(|e| MarkupError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
