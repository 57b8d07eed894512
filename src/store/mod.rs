// src/store/mod.rs
//
// Persistence: per-hearing artifacts (transcript text + JSON record) and the
// consolidated tabular dataset (Parquet + CSV). All writes go through a tmp
// file and a rename, so readers never see a half-written file.

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int32Array, StringArray, UInt16Array, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

use crate::model::{HearingRecord, HearingRow};

/// Column order of the dataset, fixed by the tabular layout.
pub const DATASET_COLUMNS: [&str; 9] = [
    "index",
    "congress",
    "committee",
    "month",
    "day",
    "year",
    "subcommittee",
    "title",
    "text",
];

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, contents).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}

/// Save `<slug>.txt` (transcript) and `<slug>.json` (full record) under
/// `dir`, creating it if needed. Returns the JSON path.
pub fn write_artifacts(dir: &Path, record: &HearingRecord) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let slug = record.slug();

    let txt_path = dir.join(format!("{}.txt", slug));
    write_atomically(&txt_path, record.transcript.as_bytes())?;

    let json_path = dir.join(format!("{}.json", slug));
    let mut json = serde_json::to_vec_pretty(record).context("serializing hearing record")?;
    json.push(b'\n');
    write_atomically(&json_path, &json)?;

    debug!(slug = %slug, "artifacts written");
    Ok(json_path)
}

/// Read every `*.json` record under `dir`, sorted by filename so dataset
/// indices are stable across runs.
pub fn load_records(dir: &Path) -> Result<Vec<HearingRecord>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    if dir.is_dir() {
        for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
    }
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let file =
            File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let record: HearingRecord = serde_json::from_reader(file)
            .with_context(|| format!("parsing {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}

/// Project records into dataset rows, assigning the running index.
pub fn rows_from_records(records: &[HearingRecord]) -> Vec<HearingRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, rec)| HearingRow::from_record(i as u64, rec))
        .collect()
}

fn dataset_schema() -> Schema {
    Schema::new(vec![
        Field::new("index", DataType::UInt64, false),
        Field::new("congress", DataType::UInt16, true),
        Field::new("committee", DataType::Utf8, true),
        Field::new("month", DataType::UInt32, true),
        Field::new("day", DataType::UInt32, true),
        Field::new("year", DataType::Int32, true),
        Field::new("subcommittee", DataType::Utf8, true),
        Field::new("title", DataType::Utf8, true),
        Field::new("text", DataType::Utf8, false),
    ])
}

/// Write the rows as a single SNAPPY-compressed Parquet file.
pub fn write_parquet(rows: &[HearingRow], path: &Path) -> Result<()> {
    let schema = Arc::new(dataset_schema());

    let index: ArrayRef = Arc::new(UInt64Array::from(
        rows.iter().map(|r| r.index).collect::<Vec<_>>(),
    ));
    let congress: ArrayRef = Arc::new(
        rows.iter()
            .map(|r| r.congress)
            .collect::<UInt16Array>(),
    );
    let committee: ArrayRef = Arc::new(
        rows.iter()
            .map(|r| r.committee.clone())
            .collect::<StringArray>(),
    );
    let month: ArrayRef = Arc::new(rows.iter().map(|r| r.month).collect::<UInt32Array>());
    let day: ArrayRef = Arc::new(rows.iter().map(|r| r.day).collect::<UInt32Array>());
    let year: ArrayRef = Arc::new(rows.iter().map(|r| r.year).collect::<Int32Array>());
    let subcommittee: ArrayRef = Arc::new(
        rows.iter()
            .map(|r| r.subcommittee.clone())
            .collect::<StringArray>(),
    );
    let title: ArrayRef = Arc::new(
        rows.iter()
            .map(|r| r.title.clone())
            .collect::<StringArray>(),
    );
    let text: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|r| r.text.as_str()).collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            index,
            congress,
            committee,
            month,
            day,
            year,
            subcommittee,
            title,
            text,
        ],
    )
    .context("building dataset record batch")?;

    let tmp = tmp_path(path);
    let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), schema, Some(props))
        .context("creating Arrow writer for dataset")?;
    writer.write(&batch).context("writing dataset batch")?;
    writer.close().context("closing dataset writer")?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} -> {}", tmp.display(), path.display()))?;

    info!(rows = rows.len(), path = %path.display(), "parquet dataset written");
    Ok(())
}

/// Write the rows as CSV with the dataset header, empty cells for nulls.
pub fn write_csv(rows: &[HearingRow], path: &Path) -> Result<()> {
    fn cell<T: ToString>(v: &Option<T>) -> String {
        v.as_ref().map(|x| x.to_string()).unwrap_or_default()
    }

    let tmp = tmp_path(path);
    let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    let mut wtr = csv::Writer::from_writer(BufWriter::new(file));
    wtr.write_record(DATASET_COLUMNS)
        .context("writing CSV header")?;
    for row in rows {
        wtr.write_record([
            row.index.to_string(),
            cell(&row.congress),
            cell(&row.committee),
            cell(&row.month),
            cell(&row.day),
            cell(&row.year),
            cell(&row.subcommittee),
            cell(&row.title),
            row.text.clone(),
        ])
        .with_context(|| format!("writing CSV row {}", row.index))?;
    }
    wtr.flush().context("flushing CSV")?;
    drop(wtr);
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} -> {}", tmp.display(), path.display()))?;

    info!(rows = rows.len(), path = %path.display(), "csv dataset written");
    Ok(())
}

/// Rebuild both dataset files from the records under `records_dir`.
pub fn rebuild_dataset(records_dir: &Path, dataset_dir: &Path) -> Result<usize> {
    let records = load_records(records_dir)?;
    let rows = rows_from_records(&records);
    fs::create_dir_all(dataset_dir)
        .with_context(|| format!("creating {}", dataset_dir.display()))?;
    write_parquet(&rows, &dataset_dir.join("hearings.parquet"))?;
    write_csv(&rows, &dataset_dir.join("hearings.csv"))?;
    Ok(rows.len())
}
