// src/model.rs

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::extract::{
    self, chamber_from_url, congress_from_url, congress_years, date_components, Chamber,
};

/// One scraped hearing document. This is the unit persisted as
/// `<slug>.json`, with the transcript duplicated into `<slug>.txt`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HearingRecord {
    pub url: String,
    pub title: Option<String>,
    pub date_text: Option<String>,
    pub date_iso: Option<NaiveDate>,
    pub congress: Option<u16>,
    pub chamber: Option<Chamber>,
    pub committee: Option<String>,
    pub subcommittee: Option<String>,
    pub transcript: String,
}

impl HearingRecord {
    /// Build a record from a page URL and its extracted main text. Field
    /// extraction never fails; individual fields degrade to `None`.
    pub fn assemble(url: &Url, main_text: String) -> Self {
        let fields = extract::extract_fields(&main_text);
        let date_iso = fields
            .date_text
            .as_deref()
            .and_then(extract::iso_from_date_text);
        let congress = congress_from_url(url);

        // The year printed in the document must fall inside the congress's
        // two-year span; a mismatch means one of the two was misread.
        if let (Some(n), Some(date)) = (congress, date_iso) {
            let (first, second) = congress_years(n);
            let year = date.year();
            if year != first && year != second {
                warn!(%url, congress = n, year, "document year outside congress span");
            }
        }

        HearingRecord {
            url: url.to_string(),
            title: fields.title,
            date_text: fields.date_text,
            date_iso,
            congress,
            chamber: chamber_from_url(url),
            committee: fields.committee,
            subcommittee: fields.subcommittee,
            transcript: main_text,
        }
    }

    /// A filesystem-safe name derived from the URL path, used for artifact
    /// and history filenames.
    pub fn slug(&self) -> String {
        slug_for_url_str(&self.url)
    }
}

/// One row of the tabular dataset:
/// index, congress, committee, month, day, year, subcommittee, title, text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HearingRow {
    pub index: u64,
    pub congress: Option<u16>,
    pub committee: Option<String>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub year: Option<i32>,
    pub subcommittee: Option<String>,
    pub title: Option<String>,
    pub text: String,
}

impl HearingRow {
    pub fn from_record(index: u64, record: &HearingRecord) -> Self {
        let (month, day, year) = match record.date_iso {
            Some(date) => {
                let (m, d, y) = date_components(date);
                (Some(m), Some(d), Some(y))
            }
            None => (None, None, None),
        };
        HearingRow {
            index,
            congress: record.congress,
            committee: record.committee.clone(),
            month,
            day,
            year,
            subcommittee: record.subcommittee.clone(),
            title: record.title.clone(),
            text: record.transcript.clone(),
        }
    }
}

/// Turn a hearing URL into a filename stem: path segments joined by `-`,
/// anything outside `[A-Za-z0-9._-]` replaced with `-`, runs collapsed.
pub fn slug_for_url(url: &Url) -> String {
    let mut out = String::new();
    let mut last_dash = true;
    for c in url.path().chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            c
        } else {
            '-'
        };
        if mapped == '-' {
            if !last_dash {
                out.push('-');
            }
            last_dash = true;
        } else {
            out.push(mapped);
            last_dash = false;
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "root".to_string()
    } else {
        trimmed.to_string()
    }
}

fn slug_for_url_str(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => slug_for_url(&u),
        Err(_) => "invalid-url".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_TEXT: &str = "\
Oversight of the Federal Judiciary
Committee: Committee on the Judiciary
Subcommittee: Courts, Intellectual Property, and the Internet
Date: March 5, 2024
Witness testimony follows.";

    fn sample_url() -> Url {
        Url::parse("https://www.congress.gov/event/118th-congress/house-event/117090/text").unwrap()
    }

    #[test]
    fn assemble_fills_every_axis() {
        let rec = HearingRecord::assemble(&sample_url(), PAGE_TEXT.to_string());
        assert_eq!(rec.title.as_deref(), Some("Oversight of the Federal Judiciary"));
        assert_eq!(rec.date_iso.unwrap().to_string(), "2024-03-05");
        assert_eq!(rec.congress, Some(118));
        assert_eq!(rec.chamber, Some(Chamber::House));
        assert_eq!(rec.committee.as_deref(), Some("Committee on the Judiciary"));
        assert!(rec.transcript.contains("Witness testimony"));
    }

    #[test]
    fn row_projection_matches_the_tabular_layout() {
        let rec = HearingRecord::assemble(&sample_url(), PAGE_TEXT.to_string());
        let row = HearingRow::from_record(7, &rec);
        assert_eq!(row.index, 7);
        assert_eq!(row.congress, Some(118));
        assert_eq!((row.month, row.day, row.year), (Some(3), Some(5), Some(2024)));
        assert_eq!(row.subcommittee.as_deref(), rec.subcommittee.as_deref());
        assert_eq!(row.text, rec.transcript);
    }

    #[test]
    fn row_without_date_has_null_components() {
        let rec = HearingRecord::assemble(&sample_url(), "A Hearing Title".to_string());
        let row = HearingRow::from_record(0, &rec);
        assert_eq!((row.month, row.day, row.year), (None, None, None));
    }

    #[test]
    fn slugs_are_filesystem_safe() {
        assert_eq!(
            slug_for_url(&sample_url()),
            "event-118th-congress-house-event-117090-text"
        );
        let root = Url::parse("https://www.congress.gov/").unwrap();
        assert_eq!(slug_for_url(&root), "root");
    }

    #[test]
    fn record_round_trips_through_json() {
        let rec = HearingRecord::assemble(&sample_url(), PAGE_TEXT.to_string());
        let json = serde_json::to_string(&rec).unwrap();
        let back: HearingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
