//! XML documents
//!
//! quick-xml events are folded into a small owned element tree that the
//! XPath subset can walk.

use std::collections::HashSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Axis, MarkupError, Step, XPath};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated descendant text, trimmed
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    /// Elements matching a relative XPath evaluated from this element
    pub fn xpath(&self, expr: &str) -> Result<Vec<&XmlElement>, MarkupError> {
        let path = XPath::parse(expr)?;
        if path.absolute {
            return Err(MarkupError::UnsupportedXPath {
                expr: expr.to_string(),
                reason: "absolute paths need the document, not an element".to_string(),
            });
        }
        Ok(evaluate(self, &path))
    }

    pub fn at_xpath(&self, expr: &str) -> Result<Option<&XmlElement>, MarkupError> {
        Ok(self.xpath(expr)?.into_iter().next())
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, MarkupError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| MarkupError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| MarkupError::Xml(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    // Unnamed node whose only element child is the root element
    document: XmlElement,
}

impl XmlDocument {
    pub fn parse(xml: &str) -> Result<Self, MarkupError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack = vec![XmlElement::default()];

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(XmlElement::from_start(&e)?),
                Ok(Event::Empty(e)) => {
                    let el = XmlElement::from_start(&e)?;
                    push_child(&mut stack, XmlNode::Element(el))?;
                }
                Ok(Event::End(_)) => {
                    if stack.len() < 2 {
                        return Err(MarkupError::Xml("unexpected closing tag".to_string()));
                    }
                    if let Some(el) = stack.pop() {
                        push_child(&mut stack, XmlNode::Element(el))?;
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|e| MarkupError::Xml(e.to_string()))?;
                    if stack.len() > 1 {
                        push_child(&mut stack, XmlNode::Text(text.into_owned()))?;
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    push_child(&mut stack, XmlNode::Text(text))?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(MarkupError::Xml(format!(
                        "{} at byte {}",
                        e,
                        reader.error_position()
                    )))
                }
                // declarations, comments, processing instructions
                _ => {}
            }
        }

        if stack.len() != 1 {
            return Err(MarkupError::Xml(format!(
                "{} unclosed element(s)",
                stack.len() - 1
            )));
        }
        let document = stack.pop().unwrap_or_default();
        if document.elements().next().is_none() {
            return Err(MarkupError::Xml("document has no root element".to_string()));
        }
        Ok(Self { document })
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.document.elements().next()
    }

    /// Elements matching an XPath expression in document order; relative
    /// paths start at the document node too, so `catalog/shelf` names the root
    pub fn xpath(&self, expr: &str) -> Result<Vec<&XmlElement>, MarkupError> {
        let path = XPath::parse(expr)?;
        Ok(evaluate(&self.document, &path))
    }

    pub fn at_xpath(&self, expr: &str) -> Result<Option<&XmlElement>, MarkupError> {
        Ok(self.xpath(expr)?.into_iter().next())
    }
}

fn push_child(stack: &mut [XmlElement], node: XmlNode) -> Result<(), MarkupError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None => Err(MarkupError::Xml("content outside of the document".to_string())),
    }
}

fn evaluate<'a>(context: &'a XmlElement, path: &XPath) -> Vec<&'a XmlElement> {
    let mut current = vec![context];

    for step in &path.steps {
        let selected: HashSet<*const XmlElement> =
            current.iter().map(|el| *el as *const XmlElement).collect();
        let mut next = Vec::new();
        select_step(context, step, &selected, false, &mut next);
        current = next;
    }

    current
}

/// One pre-order walk per step: each element is visited once, so the result
/// is in document order without duplicates
fn select_step<'a>(
    parent: &'a XmlElement,
    step: &Step,
    selected: &HashSet<*const XmlElement>,
    below_selected: bool,
    out: &mut Vec<&'a XmlElement>,
) {
    let parent_selected = selected.contains(&(parent as *const XmlElement));
    let in_scope = match step.axis {
        Axis::Child => parent_selected,
        Axis::Descendant => parent_selected || below_selected,
    };

    for child in parent.elements() {
        if in_scope && step.matches(child.name(), |a| child.attr(a)) {
            out.push(child);
        }
        select_step(child, step, selected, parent_selected || below_selected, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"<?xml version="1.0"?>
    <catalog>
        <!-- two shelves -->
        <shelf id="a">
            <item sku="1">Lamp</item>
            <item sku="2" featured="yes">Desk &amp; Chair</item>
        </shelf>
        <shelf id="b">
            <item sku="3"/>
            <note><![CDATA[fragile <glass>]]></note>
        </shelf>
    </catalog>"#;

    #[test]
    fn test_parse_tree() {
        let doc = XmlDocument::parse(CATALOG).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.name(), "catalog");
        assert_eq!(root.elements().count(), 2);
    }

    #[test]
    fn test_descendant_and_child_paths() {
        let doc = XmlDocument::parse(CATALOG).unwrap();

        assert_eq!(doc.xpath("//item").unwrap().len(), 3);
        assert_eq!(doc.xpath("/catalog/shelf").unwrap().len(), 2);
        assert_eq!(doc.xpath("catalog/shelf/item").unwrap().len(), 3);
        assert!(doc.xpath("/shelf").unwrap().is_empty());
    }

    #[test]
    fn test_relative_paths_start_at_document() {
        let doc = XmlDocument::parse(
            "<bookstore><book><title>A</title></book><book><title>B</title></book></bookstore>",
        )
        .unwrap();
        assert_eq!(doc.xpath("bookstore/book").unwrap().len(), 2);
        assert_eq!(doc.xpath("bookstore/book/title").unwrap()[1].text(), "B");
        assert!(doc.xpath("book").unwrap().is_empty());

        let catalog = XmlDocument::parse(CATALOG).unwrap();
        assert!(catalog.xpath("shelf/item").unwrap().is_empty());
    }

    #[test]
    fn test_results_in_document_order() {
        let doc = XmlDocument::parse(r#"<a><a><b n="1"/></a><b n="2"/></a>"#).unwrap();
        let found: Vec<_> = doc
            .xpath("//a/b")
            .unwrap()
            .into_iter()
            .map(|b| b.attr("n"))
            .collect();
        assert_eq!(found, [Some("1"), Some("2")]);

        let nested = XmlDocument::parse("<a><a><a/></a></a>").unwrap();
        assert_eq!(nested.xpath("//a//a").unwrap().len(), 2);
    }

    #[test]
    fn test_predicates_and_text() {
        let doc = XmlDocument::parse(CATALOG).unwrap();

        let featured = doc.at_xpath("//item[@featured]").unwrap().unwrap();
        assert_eq!(featured.text(), "Desk & Chair");
        assert_eq!(featured.attr("sku"), Some("2"));

        let shelf_b = doc.at_xpath("//shelf[@id='b']").unwrap().unwrap();
        assert_eq!(
            shelf_b.at_xpath("note").unwrap().unwrap().text(),
            "fragile <glass>"
        );
        assert!(shelf_b.at_xpath("missing").unwrap().is_none());
    }

    #[test]
    fn test_element_rejects_absolute_path() {
        let doc = XmlDocument::parse(CATALOG).unwrap();
        let root = doc.root().unwrap();
        assert!(root.xpath("//item").is_err());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            XmlDocument::parse("<a><b></a>"),
            Err(MarkupError::Xml(_))
        ));
        assert!(matches!(XmlDocument::parse("<a>"), Err(MarkupError::Xml(_))));
        assert!(matches!(XmlDocument::parse("   "), Err(MarkupError::Xml(_))));
    }
}
