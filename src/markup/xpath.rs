//! Restricted XPath
//!
//! Location paths built from name tests (`book`, `*`), the child (`/`) and
//! descendant (`//`) axes, and attribute predicates (`[@id]`,
//! `[@class="x"]`). XML documents evaluate these directly; HTML documents
//! translate them to CSS selectors.
//!
//! Supported patterns:
//! - //tag               -> tag
//! - //tag[@class='x']   -> tag[class="x"]
//! - //*[@id='x']        -> *[id="x"]
//! - //tag1/tag2         -> tag1 > tag2
//! - //tag1//tag2        -> tag1 tag2

use super::MarkupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
}

/// `[@attr]` or `[@attr="value"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub attr: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    /// `None` is the `*` name test
    pub name: Option<String>,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

impl XPath {
    pub fn parse(expr: &str) -> Result<Self, MarkupError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(unsupported(expr, "empty expression"));
        }
        if trimmed.contains('|') {
            return Err(unsupported(expr, "union expressions are not supported"));
        }

        let absolute = trimmed.starts_with('/');
        let mut rest = trimmed;
        let mut steps = Vec::new();

        loop {
            let axis = if let Some(r) = rest.strip_prefix("//") {
                rest = r;
                Axis::Descendant
            } else if let Some(r) = rest.strip_prefix('/') {
                rest = r;
                Axis::Child
            } else {
                Axis::Child
            };

            let end = rest.find(['/', '[']).unwrap_or(rest.len());
            let name = &rest[..end];
            if name.is_empty() {
                return Err(unsupported(expr, "missing name test"));
            }
            if name != "*" && !is_name(name) {
                return Err(unsupported(
                    expr,
                    &format!("`{name}` is not an element name test"),
                ));
            }
            rest = &rest[end..];

            let mut predicates = Vec::new();
            while let Some(r) = rest.strip_prefix('[') {
                let close = r
                    .find(']')
                    .ok_or_else(|| unsupported(expr, "unterminated predicate"))?;
                predicates.push(parse_predicate(expr, &r[..close])?);
                rest = &r[close + 1..];
            }

            steps.push(Step {
                axis,
                name: (name != "*").then(|| name.to_string()),
                predicates,
            });

            if rest.is_empty() {
                break;
            }
            if !rest.starts_with('/') {
                return Err(unsupported(expr, &format!("unexpected `{rest}`")));
            }
        }

        Ok(Self { absolute, steps })
    }

    /// Equivalent CSS selector, evaluated against the whole document
    ///
    /// A leading `/` step is pinned to the root element with `:root`.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                css.push_str(match step.axis {
                    Axis::Child => " > ",
                    Axis::Descendant => " ",
                });
            }
            css.push_str(step.name.as_deref().unwrap_or("*"));
            if i == 0 && self.absolute && step.axis == Axis::Child {
                css.push_str(":root");
            }
            for predicate in &step.predicates {
                match &predicate.value {
                    Some(value) => css.push_str(&format!(
                        "[{}=\"{}\"]",
                        predicate.attr,
                        value.replace('\\', "\\\\").replace('"', "\\\"")
                    )),
                    None => css.push_str(&format!("[{}]", predicate.attr)),
                }
            }
        }
        css
    }
}

impl Step {
    /// Name test plus every predicate, using `attr` to look attributes up
    pub fn matches<'a>(&self, name: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(expected) = &self.name {
            if expected != name {
                return false;
            }
        }
        self.predicates.iter().all(|p| match (&p.value, attr(&p.attr)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        })
    }
}

fn parse_predicate(expr: &str, body: &str) -> Result<Predicate, MarkupError> {
    let attr_part = body
        .trim()
        .strip_prefix('@')
        .ok_or_else(|| unsupported(expr, &format!("predicate `{body}` is not an attribute test")))?;

    match attr_part.split_once('=') {
        Some((attr, value)) => {
            let attr = attr.trim();
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .ok_or_else(|| unsupported(expr, "attribute value must be quoted"))?;
            if !is_name(attr) {
                return Err(unsupported(expr, &format!("`{attr}` is not an attribute name")));
            }
            Ok(Predicate {
                attr: attr.to_string(),
                value: Some(unquoted.to_string()),
            })
        }
        None => {
            let attr = attr_part.trim();
            if !is_name(attr) {
                return Err(unsupported(expr, &format!("`{attr}` is not an attribute name")));
            }
            Ok(Predicate {
                attr: attr.to_string(),
                value: None,
            })
        }
    }
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

fn unsupported(expr: &str, reason: &str) -> MarkupError {
    MarkupError::UnsupportedXPath {
        expr: expr.to_string(),
        reason: reason.to_string(),
    }
}
