//! quotes.toscrape.com

use super::{render_batch, FieldRule, ItemBatch, Target, BROWSER_USER_AGENT};
use crate::present::{Detail, Layout, Palette};

pub const QUOTES: Target = Target {
    name: "quotes",
    url: "http://quotes.toscrape.com/",
    user_agent: BROWSER_USER_AGENT,
    item_selector: ".quote",
    limit: 5,
    fields: &[
        FieldRule::text("text", Some(".text")),
        FieldRule::text("author", Some(".author")),
        FieldRule::text("tags", Some(".tag")).all(),
    ],
};

const QUOTE_LAYOUT: Layout = Layout {
    headline: "text",
    details: &[
        Detail {
            prefix: "- ",
            field: "author",
            width: None,
        },
        Detail {
            prefix: "- Tags: ",
            field: "tags",
            width: None,
        },
    ],
    blank_after: true,
};

pub fn render_quotes(batch: &ItemBatch, palette: &Palette) -> String {
    render_batch(
        &format!("Found {} quotes:", batch.found),
        batch,
        &QUOTE_LAYOUT,
        palette,
    )
}
