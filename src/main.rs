use anyhow::Result;
use congresscraper::{
    config::ScrapeConfig,
    fetch::{self, sitemap, PoliteClient},
    history::{Event, History},
    model::{slug_for_url, HearingRecord},
    robots::RobotsPolicy,
    store,
};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,congresscraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config (optional path as first arg) ─────────────────
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ScrapeConfig::load(config_path.as_deref())?;
    for d in [&config.records_dir, &config.dataset_dir, &config.history_dir] {
        fs::create_dir_all(d)?;
    }

    // ─── 3) robots policy + polite client ────────────────────────────
    let client = fetch::build_client(config.request_timeout())?;
    let policy = if config.fetch_live_robots {
        fetch::fetch_robots_policy(&client).await
    } else {
        RobotsPolicy::congress_default()
    }
    .with_delay_floor(config.crawl_delay_floor());
    info!(delay = ?policy.crawl_delay(), "robots policy ready");

    let polite = Arc::new(PoliteClient::new(
        client,
        policy,
        config.jitter(),
        config.max_retries,
        config.initial_backoff_ms,
    ));
    if let Err(e) = polite.warm_up().await {
        warn!(error = %e, "warm-up failed; continuing");
    }

    // ─── 4) load history to skip finished hearings ───────────────────
    let history = Arc::new(History::new(&config.history_dir)?);
    let parsed: HashSet<String> = history.load_event_names(Event::Parsed)?;
    info!(count = parsed.len(), "hearings already done");

    // ─── 5) discover hearing URLs ────────────────────────────────────
    let mut urls: Vec<Url> = Vec::new();
    for seed in &config.seed_urls {
        match Url::parse(seed) {
            Ok(u) => urls.push(u),
            Err(e) => warn!(seed = %seed, error = %e, "skipping bad seed URL"),
        }
    }
    if config.use_sitemap {
        match sitemap::discover_hearing_urls(&polite, config.congress).await {
            Ok(found) => urls.extend(found),
            Err(e) => error!(error = %e, "sitemap discovery failed"),
        }
    }
    urls.sort();
    urls.dedup();
    let to_scrape: Vec<Url> = urls
        .into_iter()
        .filter(|u| !parsed.contains(&slug_for_url(u)))
        .collect();

    if to_scrape.is_empty() {
        info!("no new hearings; rebuilding dataset and exiting");
        let n = store::rebuild_dataset(&config.records_dir, &config.dataset_dir)?;
        info!(rows = n, "dataset rebuilt");
        return Ok(());
    }
    info!(count = to_scrape.len(), "hearings to scrape");

    // ─── 6) fetcher task ─────────────────────────────────────────────
    // One task is enough: the crawl delay serializes requests anyway, and
    // the channel lets parsing overlap with the next wait.
    let (tx, mut rx) = mpsc::channel::<(Url, String)>(8);
    let fetcher = {
        let polite = Arc::clone(&polite);
        let history = Arc::clone(&history);
        tokio::spawn(async move {
            for url in to_scrape {
                match polite.get_text(&url).await {
                    Ok(body) => {
                        if let Err(e) = history.record_event(&slug_for_url(&url), Event::Fetched) {
                            error!(%url, error = %e, "recording fetch history failed");
                        }
                        if tx.send((url, body)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => error!(%url, error = %e, "fetch failed"),
                }
            }
        })
    };

    // ─── 7) parse + persist each fetched page ────────────────────────
    // Anything that goes wrong with one page costs that page, not the run.
    while let Some((url, body)) = rx.recv().await {
        let records_dir = config.records_dir.clone();
        let joined =
            tokio::task::spawn_blocking(move || process_page(&records_dir, &url, &body)).await;

        match joined {
            Ok(Ok(record)) => {
                record_parsed(&history, &record);
                info!(
                    slug = %record.slug(),
                    title = record.title.as_deref().unwrap_or("<none>"),
                    "hearing stored"
                );
            }
            Ok(Err(e)) => error!(error = %e, "processing failed"),
            Err(e) => error!(error = %e, "processing task panicked"),
        }
    }
    let _ = fetcher.await;

    // ─── 8) rebuild the consolidated dataset ─────────────────────────
    let n = store::rebuild_dataset(&config.records_dir, &config.dataset_dir)?;
    info!(rows = n, "dataset rebuilt");

    info!("all done");
    Ok(())
}

/// Extract, assemble, and persist one fetched page.
fn process_page(records_dir: &Path, url: &Url, body: &str) -> Result<HearingRecord> {
    let text = congresscraper::extract::main_text(body);
    let record = HearingRecord::assemble(url, text);
    store::write_artifacts(records_dir, &record)?;
    Ok(record)
}

/// Mark a hearing parsed. A failed history write costs one rerun skip,
/// never the run.
fn record_parsed(history: &History, record: &HearingRecord) {
    if let Err(e) = history.record_event(&record.slug(), Event::Parsed) {
        error!(slug = %record.slug(), error = %e, "recording parse history failed");
    }
}
