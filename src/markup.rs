//! Markup parsing and querying
//!
//! HTML goes through `scraper`, XML through `quick-xml`. Both sides answer the
//! same small set of questions: first match, all matches, XPath, attribute,
//! text. Nothing here tokenizes HTML by hand.

mod builder;
mod html;
mod xml;
mod xpath;

pub use builder::*;
pub use html::*;
pub use xml::*;
pub use xpath::{Axis, Predicate, Step, XPath};

/// Errors raised while parsing a document or a query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("invalid CSS selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("unsupported XPath expression `{expr}`: {reason}")]
    UnsupportedXPath { expr: String, reason: String },

    #[error("malformed XML: {0}")]
    Xml(String),
}
