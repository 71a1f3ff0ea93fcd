//! Programmatic HTML construction
//!
//! Elements holding only text render on one line; anything with element
//! children is indented two spaces per level.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Built {
    Element(ElementBuilder),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBuilder {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Built>,
}

impl ElementBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Built::Text(text.to_string()));
        self
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(Built::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementBuilder>) -> Self {
        self.children
            .extend(children.into_iter().map(Built::Element));
        self
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out, 0);
        out
    }

    fn write_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
        }
        out.push('>');

        let inline = self.children.iter().all(|c| matches!(c, Built::Text(_)));
        if inline {
            for child in &self.children {
                if let Built::Text(t) = child {
                    out.push_str(&escape_text(t));
                }
            }
        } else {
            out.push('\n');
            for child in &self.children {
                match child {
                    Built::Element(el) => el.write_into(out, depth + 1),
                    Built::Text(t) => {
                        out.push_str(&"  ".repeat(depth + 1));
                        out.push_str(&escape_text(t));
                        out.push('\n');
                    }
                }
            }
            out.push_str(&indent);
        }

        out.push_str("</");
        out.push_str(&self.tag);
        out.push_str(">\n");
    }
}

/// Full document with doctype
pub fn render_document(root: &ElementBuilder) -> String {
    format!("<!DOCTYPE html>\n{}", root.to_html())
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let page = ElementBuilder::new("ul")
            .attr("class", "langs")
            .children(["Rust", "C"].iter().map(|l| ElementBuilder::new("li").text(l)));

        assert_eq!(
            page.to_html(),
            "<ul class=\"langs\">\n  <li>Rust</li>\n  <li>C</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_escaping() {
        let el = ElementBuilder::new("p")
            .attr("title", "say \"hi\"")
            .text("a < b & c");
        assert_eq!(
            el.to_html(),
            "<p title=\"say &quot;hi&quot;\">a &lt; b &amp; c</p>\n"
        );
    }

    #[test]
    fn test_document_has_doctype() {
        let html = render_document(&ElementBuilder::new("html"));
        assert!(html.starts_with("<!DOCTYPE html>\n<html></html>"));
    }
}
