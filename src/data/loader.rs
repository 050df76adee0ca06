// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Fetches the churn CSV and parses it into CustomerRecords.
//
// Two locations are supported:
//   - Url:  downloaded once with reqwest, then read from the cache dir
//   - Path: a local copy of the same file
//
// Parsing uses the csv crate's serde support. Every field is
// trimmed, so the " " cells of TotalCharges become empty and
// deserialize to None.
//
// Reference: csv crate documentation (serde support)

use anyhow::{anyhow, ensure, Context, Result};
use csv::{ReaderBuilder, Trim};
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use crate::domain::record::CustomerRecord;
use crate::domain::traits::RecordSource;

/// The dataset the demo was built around
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/curiousily/Customer-Churn-Detection-with-TensorFlow-js/master/src/data/customer-churn.csv";

/// Where the CSV comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataLocation {
    Url(String),
    Path(PathBuf),
}

pub struct CsvLoader {
    location:  DataLocation,
    cache_dir: PathBuf,
}

impl CsvLoader {
    pub fn new(location: DataLocation, cache_dir: impl Into<PathBuf>) -> Self {
        Self { location, cache_dir: cache_dir.into() }
    }

    /// Resolve the location to a file on disk, downloading if needed
    fn local_file(&self) -> Result<PathBuf> {
        match &self.location {
            DataLocation::Path(path) => Ok(path.clone()),
            DataLocation::Url(url)   => download_file(url, &self.cache_dir),
        }
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<CustomerRecord>> {
        let path = self.local_file()?;
        let file = fs::File::open(&path)
            .with_context(|| format!("Cannot open dataset '{}'", path.display()))?;

        let records = parse_records(file)
            .with_context(|| format!("Cannot parse dataset '{}'", path.display()))?;

        tracing::info!("Loaded {} customer records from '{}'", records.len(), path.display());
        Ok(records)
    }
}

/// Parse CSV text (with header row) into records.
/// Row numbers in errors are 1-based data rows, header excluded.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<CustomerRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<CustomerRecord>().enumerate() {
        let record = row.with_context(|| format!("Malformed customer row {}", i + 1))?;
        records.push(record);
    }

    ensure!(!records.is_empty(), "Dataset contains no customer rows");
    Ok(records)
}

/// Download `url` into `directory` unless a cached copy already exists.
/// The cache file is named after the last URL path segment.
fn download_file(url: &str, directory: &Path) -> Result<PathBuf> {
    let filename = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("Cannot derive a file name from url '{url}'"))?;

    fs::create_dir_all(directory)
        .with_context(|| format!("Cannot create cache dir '{}'", directory.display()))?;

    let filepath = directory.join(filename);
    if filepath.exists() {
        tracing::debug!("Using cached dataset '{}'", filepath.display());
        return Ok(filepath);
    }

    tracing::info!("Downloading dataset from {url}");
    let body = reqwest::blocking::get(url)
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .with_context(|| format!("Failed to download '{url}'"))?;

    fs::write(&filepath, &body)
        .with_context(|| format!("Cannot write '{}'", filepath.display()))?;
    tracing::info!("Cached {} bytes at '{}'", body.len(), filepath.display());

    Ok(filepath)
}
