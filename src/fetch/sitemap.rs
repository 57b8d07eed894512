// src/fetch/sitemap.rs

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::PoliteClient;
use crate::extract::congress_from_url;

/// Path markers that identify a hearing / committee-meeting page.
const HEARING_PATH_MARKERS: &[&str] = &["/event/", "/committee-meeting/"];

/// Pull every `<loc>` entry out of a sitemap document. The html5ever parser
/// is lenient enough to walk sitemap XML, which keeps us on one parser for
/// both HTML pages and sitemaps.
pub fn extract_locs(xml: &str) -> Vec<Url> {
    let doc = Html::parse_document(xml);
    let sel = Selector::parse("loc").expect("loc selector parses");
    doc.select(&sel)
        .map(|el| el.text().collect::<String>())
        .filter_map(|t| Url::parse(t.trim()).ok())
        .collect()
}

/// Whether `url` looks like a hearing page, optionally restricted to one
/// congress.
pub fn is_hearing_url(url: &Url, congress: Option<u16>) -> bool {
    let path = url.path();
    if !HEARING_PATH_MARKERS.iter().any(|m| path.contains(m)) {
        return false;
    }
    match congress {
        Some(n) => congress_from_url(url) == Some(n),
        None => true,
    }
}

fn is_nested_sitemap(url: &Url) -> bool {
    url.path().ends_with(".xml")
}

/// Walk the declared sitemap index and return the hearing-page URLs it
/// lists. Nested sitemaps that cannot name a single hearing page (member
/// profiles, bill text, …) are skipped by the marker check on their leaf
/// URLs, so we still have to fetch each nested sitemap once.
pub async fn discover_hearing_urls(
    client: &PoliteClient,
    congress: Option<u16>,
) -> Result<Vec<Url>> {
    let index_url = client
        .policy()
        .sitemap()
        .context("robots policy declares no sitemap")?
        .clone();

    info!(%index_url, "walking sitemap index");
    let index_body = client.get_text(&index_url).await?;
    let entries = extract_locs(&index_body);
    debug!(count = entries.len(), "sitemap index entries");

    let mut hearing_urls = Vec::new();
    for entry in entries {
        if !is_nested_sitemap(&entry) {
            if is_hearing_url(&entry, congress) {
                hearing_urls.push(entry);
            }
            continue;
        }
        let body = match client.get_text(&entry).await {
            Ok(b) => b,
            Err(e) => {
                warn!(url = %entry, error = %e, "skipping unreadable sitemap");
                continue;
            }
        };
        let before = hearing_urls.len();
        hearing_urls.extend(
            extract_locs(&body)
                .into_iter()
                .filter(|u| is_hearing_url(u, congress)),
        );
        debug!(url = %entry, found = hearing_urls.len() - before, "nested sitemap walked");
    }

    hearing_urls.sort();
    hearing_urls.dedup();
    info!(count = hearing_urls.len(), "hearing URLs discovered");
    Ok(hearing_urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locs_are_extracted_from_sitemap_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://www.congress.gov/event/118th-congress/house-event/117090/text</loc></url>
  <url><loc>https://www.congress.gov/member/somebody/S000001</loc></url>
  <url><loc>not a url</loc></url>
</urlset>"#;
        let locs = extract_locs(xml);
        assert_eq!(locs.len(), 2);
        assert!(locs[0].path().contains("/event/"));
    }

    #[test]
    fn hearing_urls_are_recognized() {
        let hearing =
            Url::parse("https://www.congress.gov/event/118th-congress/house-event/117090/text")
                .unwrap();
        let meeting =
            Url::parse("https://www.congress.gov/committee-meeting/117th-congress/senate-event/52431")
                .unwrap();
        let member = Url::parse("https://www.congress.gov/member/somebody/S000001").unwrap();

        assert!(is_hearing_url(&hearing, None));
        assert!(is_hearing_url(&meeting, None));
        assert!(!is_hearing_url(&member, None));

        assert!(is_hearing_url(&hearing, Some(118)));
        assert!(!is_hearing_url(&hearing, Some(117)));
        assert!(is_hearing_url(&meeting, Some(117)));
    }
}
