//! books.toscrape.com

use super::{render_batch, FieldRule, ItemBatch, Target, Transform, BROWSER_USER_AGENT};
use crate::present::{Detail, Layout, Palette};

pub const BOOKS: Target = Target {
    name: "books",
    url: "http://books.toscrape.com/",
    user_agent: BROWSER_USER_AGENT,
    item_selector: "article.product_pod",
    limit: 10,
    fields: &[
        FieldRule::attr("title", Some("h3 a"), "title"),
        FieldRule::text("price", Some(".price_color")),
        // class="star-rating Three"
        FieldRule::attr("rating", Some(".star-rating"), "class").with(&[Transform::LastToken]),
    ],
};

const BOOK_LAYOUT: Layout = Layout {
    headline: "title",
    details: &[
        Detail {
            prefix: "- Price: ",
            field: "price",
            width: None,
        },
        Detail {
            prefix: "- Rating: ",
            field: "rating",
            width: None,
        },
    ],
    blank_after: false,
};

pub fn render_books(batch: &ItemBatch, palette: &Palette) -> String {
    render_batch(
        &format!("Found {} books:", batch.found),
        batch,
        &BOOK_LAYOUT,
        palette,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{extract_items, SelectorMiss};
    use crate::markup::HtmlDocument;
    use crate::present::PLACEHOLDER;

    fn pod(title: &str, price: &str, rating: &str) -> String {
        format!(
            r#"<li class="col-xs-6"><article class="product_pod">
                <div class="image_container"><a href="x/index.html">
                    <img src="x.jpg" alt="{title}" class="thumbnail"></a></div>
                <p class="star-rating {rating}"><i class="icon-star"></i></p>
                <h3><a href="x/index.html" title="{title}">{short}</a></h3>
                <div class="product_price"><p class="price_color">{price}</p>
                <p class="instock availability"><i class="icon-ok"></i> In stock</p></div>
            </article></li>"#,
            short = title.chars().take(10).collect::<String>()
        )
    }

    #[test]
    fn test_extract_books() {
        let pods: String = (1..=20)
            .map(|i| pod(&format!("A Very Long Book Title {i}"), "£51.77", "Three"))
            .collect();
        let html = format!("<ol class=\"row\">{pods}</ol>");
        let batch = extract_items(&HtmlDocument::parse(&html), &BOOKS).unwrap();

        assert_eq!(batch.found, 20);
        assert_eq!(batch.records.len(), 10);
        let first = &batch.records[0];
        assert_eq!(first.get("title"), Some("A Very Long Book Title 1"));
        assert_eq!(first.get("price"), Some("£51.77"));
        assert_eq!(first.get("rating"), Some("Three"));
    }

    #[test]
    fn test_render_books() {
        let html = pod("Sapiens", "£54.23", "Five");
        let batch = extract_items(&HtmlDocument::parse(&html), &BOOKS).unwrap();
        assert_eq!(
            render_books(&batch, &Palette::plain()),
            "Found 1 books:\n\n1. Sapiens\n   - Price: £54.23\n   - Rating: Five\n"
        );
    }

    #[test]
    fn test_missing_price_is_reported() {
        let html = r#"<article class="product_pod">
            <p class="star-rating One"></p>
            <h3><a title="No Price">No Price</a></h3>
        </article>"#;
        let batch = extract_items(&HtmlDocument::parse(html), &BOOKS).unwrap();

        assert_eq!(batch.records[0].get("price"), Some(PLACEHOLDER));
        assert_eq!(
            batch.misses,
            vec![SelectorMiss {
                item: 1,
                field: "price",
                selector: ".price_color",
            }]
        );

        let out = render_books(&batch, &Palette::plain());
        assert!(out.contains("   - Price: N/A\n"));
        assert!(out.ends_with("  ! item 1: `.price_color` matched nothing for `price`\n"));
    }
}
