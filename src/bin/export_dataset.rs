// Rebuild the Parquet/CSV dataset from already-saved hearing records,
// without touching the network.
//
// Usage: export_dataset [records_dir] [dataset_dir]

use anyhow::Result;
use congresscraper::store;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let mut args = std::env::args().skip(1);
    let records_dir = args.next().map(PathBuf::from).unwrap_or_else(|| "hearings".into());
    let dataset_dir = args.next().map(PathBuf::from).unwrap_or_else(|| "dataset".into());

    let rows = store::rebuild_dataset(&records_dir, &dataset_dir)?;
    info!(
        rows,
        records_dir = %records_dir.display(),
        dataset_dir = %dataset_dir.display(),
        "dataset exported"
    );
    Ok(())
}
