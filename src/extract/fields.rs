// src/extract/fields.rs
//
// Structured-field extraction from hearing document text. Hearing pages are
// loosely formatted: the title is the first substantial line, the date and
// committee appear as labeled lines near the top. The scan windows (80
// lines for the date, 100 for the committee) are generous enough for every
// layout observed on the site.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

static DATE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:Date\s*:\s*)?((?:{MONTHS})\s+\d{{1,2}},\s+\d{{4}})"
    ))
    .expect("date line pattern compiles")
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)({MONTHS})\s+(\d{{1,2}}),\s+(\d{{4}})"))
        .expect("date pattern compiles")
});

static COMMITTEE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(Committee|Subcommittee)\s*:\s*(.+)").expect("committee pattern compiles")
});

/// How many leading non-blank lines are scanned for a date line.
const DATE_WINDOW: usize = 80;
/// How many leading non-blank lines are scanned for committee labels.
const COMMITTEE_WINDOW: usize = 100;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub date_text: Option<String>,
    pub committee: Option<String>,
    pub subcommittee: Option<String>,
}

/// Pull title, date line, and committee/subcommittee out of main text.
/// Every field degrades to `None` independently.
pub fn extract_fields(main_text: &str) -> ExtractedFields {
    let lines: Vec<&str> = main_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    // First line, unless it is too short to be a title (a stray kicker like
    // "LIVE"), in which case the second.
    let title = match lines.first() {
        None => None,
        Some(first) if first.chars().count() >= 5 => Some((*first).to_string()),
        Some(first) => Some((*lines.get(1).unwrap_or(first)).to_string()),
    };

    let window = lines
        .iter()
        .take(DATE_WINDOW)
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    let date_text = DATE_LINE_RE
        .captures(&window)
        .map(|c| c[1].to_string())
        .or_else(|| DATE_RE.find(&window).map(|m| m.as_str().to_string()));

    let mut committee = None;
    let mut subcommittee = None;
    for line in lines.iter().take(COMMITTEE_WINDOW) {
        if let Some(caps) = COMMITTEE_RE.captures(line) {
            let value = caps[2].trim().to_string();
            if caps[1].eq_ignore_ascii_case("subcommittee") {
                subcommittee.get_or_insert(value);
            } else {
                committee.get_or_insert(value);
            }
        }
        if committee.is_some() && subcommittee.is_some() {
            break;
        }
    }

    ExtractedFields {
        title,
        date_text,
        committee,
        subcommittee,
    }
}

/// Parse `"March 5, 2024"`-style text into a calendar date.
pub fn iso_from_date_text(date_text: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(date_text.trim())?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month/day/year components of a parsed date, in the dataset's column
/// order.
pub fn date_components(date: NaiveDate) -> (u32, u32, i32) {
    (date.month(), date.day(), date.year())
}

fn month_number(name: &str) -> Option<u32> {
    let n = match name.to_ascii_lowercase().as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Oversight of the Federal Judiciary

Committee: Committee on the Judiciary
Subcommittee: Courts, Intellectual Property, and the Internet
Date: March 5, 2024

Witnesses appeared before the subcommittee to discuss caseloads.";

    #[test]
    fn fields_from_labeled_lines() {
        let fields = extract_fields(SAMPLE);
        assert_eq!(fields.title.as_deref(), Some("Oversight of the Federal Judiciary"));
        assert_eq!(fields.date_text.as_deref(), Some("March 5, 2024"));
        assert_eq!(
            fields.committee.as_deref(),
            Some("Committee on the Judiciary")
        );
        assert_eq!(
            fields.subcommittee.as_deref(),
            Some("Courts, Intellectual Property, and the Internet")
        );
    }

    #[test]
    fn short_first_line_defers_to_second() {
        let fields = extract_fields("LIVE\nBudget Hearing for Fiscal Year 2025\nJune 12, 2024");
        assert_eq!(
            fields.title.as_deref(),
            Some("Budget Hearing for Fiscal Year 2025")
        );
        assert_eq!(fields.date_text.as_deref(), Some("June 12, 2024"));
    }

    #[test]
    fn unlabeled_date_is_still_found() {
        let fields = extract_fields("Hearing Announcement\nHeld on January 9, 2019 in Washington");
        assert_eq!(fields.date_text.as_deref(), Some("January 9, 2019"));
    }

    #[test]
    fn date_outside_the_window_is_ignored() {
        let mut text = String::from("A Hearing Title\n");
        for i in 0..90 {
            text.push_str(&format!("filler line {}\n", i));
        }
        text.push_str("December 25, 2020\n");
        let fields = extract_fields(&text);
        assert_eq!(fields.date_text, None);
    }

    #[test]
    fn missing_fields_degrade_to_none() {
        let fields = extract_fields("Untitled notes without any structure");
        assert_eq!(
            fields.title.as_deref(),
            Some("Untitled notes without any structure")
        );
        assert_eq!(fields.date_text, None);
        assert_eq!(fields.committee, None);
        assert_eq!(fields.subcommittee, None);

        assert_eq!(extract_fields(""), ExtractedFields::default());
    }

    #[test]
    fn date_text_to_iso() {
        let date = iso_from_date_text("March 5, 2024").unwrap();
        assert_eq!(date.to_string(), "2024-03-05");
        assert_eq!(date_components(date), (3, 5, 2024));

        assert_eq!(
            iso_from_date_text("  september 30, 1999 ").unwrap().to_string(),
            "1999-09-30"
        );
        assert!(iso_from_date_text("Febtober 1, 2024").is_none());
        assert!(iso_from_date_text("February 31, 2024").is_none());
        assert!(iso_from_date_text("").is_none());
    }
}
