// src/extract/congress.rs
//
// The congress number is a categorical axis of the dataset. It is carried in
// hearing URLs as an ordinal path segment ("118th-congress"), and each
// congress maps to a fixed pair of calendar years, so the year column can be
// cross-checked against the URL.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static CONGRESS_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,3})(?:st|nd|rd|th)-congress$").expect("congress pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chamber::House => "house",
            Chamber::Senate => "senate",
        }
    }
}

/// Congress number from an ordinal path segment, e.g.
/// `/event/118th-congress/house-event/117090/text` → 118.
pub fn congress_from_url(url: &Url) -> Option<u16> {
    url.path_segments()?.find_map(|seg| {
        CONGRESS_SEGMENT_RE
            .captures(seg)
            .and_then(|c| c[1].parse().ok())
    })
}

/// Chamber from the `house-event` / `senate-event` path segment.
pub fn chamber_from_url(url: &Url) -> Option<Chamber> {
    url.path_segments()?.find_map(|seg| match seg {
        "house-event" => Some(Chamber::House),
        "senate-event" => Some(Chamber::Senate),
        _ => None,
    })
}

/// The two calendar years the nth congress sits. The 1st congress opened in
/// 1789; each one spans two years.
pub fn congress_years(congress: u16) -> (i32, i32) {
    let first = 1789 + 2 * (i32::from(congress) - 1);
    (first, first + 1)
}

/// The congress sitting in calendar year `year`. No congress sat before
/// 1789.
pub fn congress_for_year(year: i32) -> Option<u16> {
    if year < 1789 {
        return None;
    }
    u16::try_from((year - 1789) / 2 + 1).ok()
}
