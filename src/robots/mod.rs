// src/robots/mod.rs

pub mod throttle;

pub use throttle::Throttle;

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

/// The congress.gov exclusion rules, as published. Kept verbatim so the
/// crawler still behaves if the live robots.txt cannot be fetched.
pub const CONGRESS_ROBOTS_TXT: &str = "\
User-agent: *
Crawl-delay: 2
Disallow: /search
Disallow: /quick-search
Disallow: /advanced-search
Disallow: /*?q=*
Disallow: /*?r=*
Disallow: /*?s=*
Disallow: /account
Disallow: /lac
Sitemap: https://www.congress.gov/sitemap/sitemapindex.xml
";

/// A parsed robots-exclusion policy, reduced to the rule shapes congress.gov
/// actually uses: path-prefix disallows, query-parameter disallows written as
/// `/*?name=*`, one crawl delay, one sitemap.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    crawl_delay: Duration,
    disallow_prefixes: Vec<String>,
    disallow_params: Vec<String>,
    sitemap: Option<Url>,
}

impl RobotsPolicy {
    /// Parse robots.txt text. Only records in a `User-agent: *` group apply;
    /// we never claim a product token of our own.
    pub fn parse(text: &str) -> Result<Self> {
        let mut crawl_delay = None;
        let mut disallow_prefixes = Vec::new();
        let mut disallow_params = Vec::new();
        let mut sitemap = None;

        // True while the current group applies to us. Starts true so that
        // files without any User-agent line still yield their rules.
        let mut applies = true;
        let mut in_group = false;

        for raw in text.lines() {
            let line = match raw.split_once('#') {
                Some((before, _)) => before.trim(),
                None => raw.trim(),
            };
            if line.is_empty() {
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((f, v)) => (f.trim().to_ascii_lowercase(), v.trim()),
                None => continue,
            };
            match field.as_str() {
                "user-agent" => {
                    // A fresh group resets applicability; additional
                    // User-agent lines in the same group extend it.
                    if in_group {
                        applies = applies || value == "*";
                    } else {
                        applies = value == "*";
                        in_group = true;
                    }
                }
                // Sitemap lines are global and do not end a group.
                "sitemap" => {
                    let url = Url::parse(value)
                        .with_context(|| format!("bad sitemap URL {:?}", value))?;
                    sitemap = Some(url);
                }
                directive => {
                    // Any rule line closes the current User-agent run, even
                    // in a group that does not apply to us.
                    in_group = false;
                    if !applies {
                        continue;
                    }
                    match directive {
                        "disallow" => {
                            if value.is_empty() {
                                continue;
                            }
                            if let Some(param) = query_param_rule(value) {
                                disallow_params.push(param.to_string());
                            } else {
                                disallow_prefixes.push(value.trim_end_matches('*').to_string());
                            }
                        }
                        "crawl-delay" => {
                            let secs: f64 = value
                                .parse()
                                .with_context(|| format!("bad crawl-delay value {:?}", value))?;
                            crawl_delay = Some(Duration::from_secs_f64(secs));
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(RobotsPolicy {
            crawl_delay: crawl_delay.unwrap_or(Duration::ZERO),
            disallow_prefixes,
            disallow_params,
            sitemap,
        })
    }

    /// The embedded congress.gov policy.
    pub fn congress_default() -> Self {
        Self::parse(CONGRESS_ROBOTS_TXT).expect("embedded robots.txt must parse")
    }

    /// Whether the policy permits requesting `url`.
    pub fn allows(&self, url: &Url) -> bool {
        let path = url.path();
        if self
            .disallow_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }
        if url
            .query_pairs()
            .any(|(key, _)| self.disallow_params.iter().any(|p| p == key.as_ref()))
        {
            return false;
        }
        true
    }

    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay
    }

    pub fn sitemap(&self) -> Option<&Url> {
        self.sitemap.as_ref()
    }

    /// Raise the crawl delay to at least `floor`. The published delay is a
    /// minimum; a configured floor can only make us slower.
    pub fn with_delay_floor(mut self, floor: Duration) -> Self {
        if floor > self.crawl_delay {
            self.crawl_delay = floor;
        }
        self
    }
}

/// Recognize the `/*?name=*` (or `/*name=*`) wildcard shape congress.gov uses
/// to ban query parameters, returning the parameter name.
fn query_param_rule(value: &str) -> Option<&str> {
    let rest = value.strip_prefix("/*")?;
    let rest = rest.strip_prefix('?').unwrap_or(rest);
    let name = rest.strip_suffix("=*")?;
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some(name)
    } else {
        None
    }
}
