// src/fetch/mod.rs

pub mod sitemap;

use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use crate::robots::{RobotsPolicy, Throttle};

pub const HOMEPAGE: &str = "https://www.congress.gov/";
pub const ROBOTS_URL: &str = "https://www.congress.gov/robots.txt";

/// The browser identity the site is served to. congress.gov sits behind an
/// anti-bot proxy that returns an interstitial to bare library user-agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) \
Chrome/124.0 Safari/537.36";

/// Build the shared HTTP client: browser headers, cookie jar (the proxy
/// clearance token lives in a cookie), gzip, and a per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static(HOMEPAGE));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .cookie_store(true)
        .gzip(true)
        .timeout(timeout)
        .build()
        .context("building HTTP client")
}

/// Whether `body` is the anti-bot interstitial rather than real content.
pub fn is_interstitial(body: &str) -> bool {
    let lower = body.to_lowercase();
    if lower.contains("just a moment") {
        return true;
    }
    lower.contains("cloudflare")
        && (lower.contains("checking your browser") || lower.contains("enable cookies"))
}

/// Fetch the live robots.txt with a bare GET, the first request of a run.
/// The throttle built afterwards opens one crawl delay after construction,
/// so every later request is still spaced from this one. Falls back to the
/// embedded policy on any failure, so a network blip never loosens the
/// rules.
pub async fn fetch_robots_policy(client: &Client) -> RobotsPolicy {
    let fetched = async {
        let text = client
            .get(ROBOTS_URL)
            .send()
            .await
            .context("GET robots.txt")?
            .error_for_status()?
            .text()
            .await
            .context("reading robots.txt body")?;
        RobotsPolicy::parse(&text)
    }
    .await;

    match fetched {
        Ok(policy) => policy,
        Err(e) => {
            warn!(error = %e, "could not fetch live robots.txt; using embedded policy");
            RobotsPolicy::congress_default()
        }
    }
}

/// An HTTP client that refuses robots-disallowed URLs and spaces requests by
/// the published crawl delay. All page fetches go through here.
pub struct PoliteClient {
    client: Client,
    policy: RobotsPolicy,
    throttle: Throttle,
    max_retries: u32,
    initial_backoff_ms: u64,
}

impl PoliteClient {
    pub fn new(
        client: Client,
        policy: RobotsPolicy,
        jitter: Duration,
        max_retries: u32,
        initial_backoff_ms: u64,
    ) -> Self {
        let throttle = Throttle::new(policy.crawl_delay(), jitter);
        PoliteClient {
            client,
            policy,
            throttle,
            max_retries,
            initial_backoff_ms,
        }
    }

    pub fn policy(&self) -> &RobotsPolicy {
        &self.policy
    }

    /// Visit the homepage once so the cookie jar holds the proxy clearance
    /// before the first document request. An interstitial here is fine; the
    /// visit exists to collect its cookies.
    pub async fn warm_up(&self) -> Result<()> {
        let home = Url::parse(HOMEPAGE).expect("homepage URL is valid");
        self.throttle.wait().await;
        let resp = self
            .client
            .get(home)
            .send()
            .await
            .context("warm-up GET failed")?;
        debug!(status = %resp.status(), "warm-up request done");
        Ok(())
    }

    async fn get_text_once(&self, url: &Url) -> Result<String> {
        self.throttle.wait().await;
        let body = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("non-success status from {}", url))?
            .text()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        if is_interstitial(&body) {
            bail!("anti-bot interstitial served for {}", url);
        }
        Ok(body)
    }

    /// Fetch `url` as text, retrying transient failures (including the
    /// interstitial) with exponential backoff. A robots violation is an
    /// immediate error, never retried.
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        if !self.policy.allows(url) {
            bail!("robots policy disallows {}", url);
        }
        let mut attempts = 0;
        loop {
            match self.get_text_once(url).await {
                Ok(t) => return Ok(t),
                Err(e) if attempts < self.max_retries => {
                    attempts += 1;
                    let backoff = self.initial_backoff_ms * 2u64.pow(attempts - 1);
                    warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "retrying");
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    error!(%url, error = %e, "exhausted retries");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interstitial_detection() {
        assert!(is_interstitial(
            "<html><title>Just a moment...</title></html>"
        ));
        assert!(is_interstitial(
            "Cloudflare is checking your browser before accessing"
        ));
        assert!(is_interstitial(
            "Please enable cookies. ... performance by Cloudflare"
        ));
        assert!(!is_interstitial(
            "<html><body>Hearing before the Committee on the Judiciary</body></html>"
        ));
        // either phrase alone is not enough without the vendor name
        assert!(!is_interstitial("checking your browser compatibility"));
    }

    #[tokio::test]
    async fn disallowed_url_is_refused_without_a_request() {
        let client = build_client(Duration::from_secs(5)).unwrap();
        let polite = PoliteClient::new(
            client,
            RobotsPolicy::congress_default(),
            Duration::ZERO,
            0,
            1,
        );
        let url = Url::parse("https://www.congress.gov/search?q=budget").unwrap();
        let err = polite.get_text(&url).await.unwrap_err();
        assert!(err.to_string().contains("robots policy disallows"));
    }
}
