// src/extract/mod.rs

pub mod congress;
pub mod fields;

pub use congress::{chamber_from_url, congress_for_year, congress_from_url, congress_years, Chamber};
pub use fields::{date_components, extract_fields, iso_from_date_text, ExtractedFields};

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// The containers a hearing page keeps its document in, in preference
/// order. Falls back to `body` when none matches.
static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["#main", "main", "article", "#content", "body"]
        .iter()
        .map(|s| Selector::parse(s).expect("container selector parses"))
        .collect()
});

/// Extract the main document text from a hearing page, one line per text
/// node, blank runs dropped. This is the `Text` column of the dataset and
/// the input to `extract_fields`.
pub fn main_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    for sel in CONTAINER_SELECTORS.iter() {
        if let Some(el) = doc.select(sel).next() {
            let text = element_lines(el);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn element_lines(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_main_container() {
        let html = r#"<html><body>
            <nav>Skip to content</nav>
            <div id="main"><h1>Oversight Hearing</h1><p>Opening statement.</p></div>
            <footer>About us</footer>
        </body></html>"#;
        let text = main_text(html);
        assert_eq!(text, "Oversight Hearing\nOpening statement.");
    }

    #[test]
    fn falls_back_through_article_to_body() {
        let html = "<html><body><article><p>Testimony of the witness.</p></article></body></html>";
        assert_eq!(main_text(html), "Testimony of the witness.");

        let html = "<html><body><p>Bare page.</p></body></html>";
        assert_eq!(main_text(html), "Bare page.");
    }

    #[test]
    fn empty_containers_are_skipped() {
        let html = r#"<html><body><div id="main">   </div><article><p>Real text.</p></article></body></html>"#;
        assert_eq!(main_text(html), "Real text.");
    }
}
