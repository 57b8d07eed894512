// src/history/mod.rs

use anyhow::{Context, Result};
use arrow::array::{Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use glob::glob;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    collections::HashSet,
    fs,
    fs::File,
    path::PathBuf,
    sync::Arc,
};

/// What has already happened to a hearing. `Fetched` means the page body was
/// retrieved; `Parsed` means artifacts were written, so the hearing can be
/// skipped entirely on the next run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    Fetched,
    Parsed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Fetched => "fetched",
            Event::Parsed => "parsed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fetched" => Some(Event::Fetched),
            "parsed" => Some(Event::Parsed),
            _ => None,
        }
    }
}

/// Append-only run history backed by single-row Parquet files, one per
/// event, named `<slug>_<event>_<ts>.parquet`. Cheap to write mid-run and
/// scannable by filename alone.
pub struct History {
    history_dir: PathBuf,
}

impl History {
    /// Open (and create if needed) a history directory.
    pub fn new(history_dir: impl Into<PathBuf>) -> Result<Self> {
        let history_dir = history_dir.into();
        fs::create_dir_all(&history_dir)
            .with_context(|| format!("creating history directory {:?}", &history_dir))?;
        Ok(Self { history_dir })
    }

    /// Record `event` for the hearing identified by `slug`.
    pub fn record_event(&self, slug: &str, event: Event) -> Result<()> {
        let ts = Utc::now().timestamp_micros();
        let filename = format!("{}_{}_{}.parquet", slug, event.as_str(), ts);
        let path = self.history_dir.join(filename);

        let schema = Schema::new(vec![
            Field::new("hearing", DataType::Utf8, false),
            Field::new("event", DataType::Utf8, false),
            Field::new(
                "event_time",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                false,
            ),
        ]);

        let arr_hearing = Arc::new(StringArray::from(vec![slug.to_string()])) as Arc<dyn Array>;
        let arr_event =
            Arc::new(StringArray::from(vec![event.as_str().to_string()])) as Arc<dyn Array>;
        let arr_time =
            Arc::new(TimestampMicrosecondArray::from_iter_values(vec![ts])) as Arc<dyn Array>;

        let batch = RecordBatch::try_new(
            Arc::new(schema.clone()),
            vec![arr_hearing, arr_event, arr_time],
        )
        .context("building history record batch")?;

        let file =
            File::create(&path).with_context(|| format!("creating history file {:?}", &path))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, Arc::new(schema), Some(props))
            .context("creating Arrow writer for history")?;
        writer.write(&batch).context("writing history batch")?;
        writer.close().context("closing history writer")?;
        Ok(())
    }

    /// All distinct slugs that have a recorded `event`, scanned from
    /// filenames.
    pub fn load_event_names(&self, event: Event) -> Result<HashSet<String>> {
        let mut set = HashSet::new();
        let marker = format!("_{}_", event.as_str());
        let pattern = format!(
            "{}/*{}*.parquet",
            self.history_dir.display(),
            marker
        );
        for entry in glob(&pattern).context("invalid history glob pattern")? {
            if let Ok(path) = entry {
                if let Some(fname) = path.file_stem().and_then(|s| s.to_str()) {
                    // fname = "<slug>_<event>_<ts>"
                    if let Some(idx) = fname.rfind(&marker) {
                        set.insert(fname[..idx].to_string());
                    }
                }
            }
        }
        Ok(set)
    }
}
