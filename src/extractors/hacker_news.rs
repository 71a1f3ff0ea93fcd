//! news.ycombinator.com front page

use super::{render_batch, FieldRule, ItemBatch, Target, Transform, BROWSER_USER_AGENT};
use crate::present::{Detail, Layout, Palette};

pub const HN_URL: &str = "https://news.ycombinator.com/";

/// Link preview width
pub const LINK_WIDTH: usize = 70;

pub const HACKER_NEWS: Target = Target {
    name: "hacker-news",
    url: HN_URL,
    user_agent: BROWSER_USER_AGENT,
    item_selector: ".titleline > a",
    limit: 10,
    fields: &[
        FieldRule::text("title", None),
        // "item?id=..." for Ask/Show HN posts
        FieldRule::attr("link", None, "href").with(&[Transform::Resolve(HN_URL)]),
    ],
};

/// Tutorial fetch: first five stories, announced as a tutorial client
pub const HACKER_NEWS_TOUR: Target = Target {
    name: "hacker-news-tour",
    user_agent: TUTORIAL_USER_AGENT,
    limit: 5,
    ..HACKER_NEWS
};

pub const TUTORIAL_USER_AGENT: &str =
    concat!("markup_scrape/", env!("CARGO_PKG_VERSION"), " tutorial");

const STORY_LAYOUT: Layout = Layout {
    headline: "title",
    details: &[Detail {
        prefix: "",
        field: "link",
        width: Some(LINK_WIDTH),
    }],
    blank_after: false,
};

pub fn render_hacker_news(batch: &ItemBatch, palette: &Palette) -> String {
    render_batch(
        &format!("Top {} stories:", batch.records.len()),
        batch,
        &STORY_LAYOUT,
        palette,
    )
}
