// ============================================================
// Layer 2 — ExploreUseCase
// ============================================================
// Loads the dataset and renders the descriptive charts only:
// churn pie, sex/senior grouped bars, three overlaid histograms.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    loader::{CsvLoader, DataLocation, DEFAULT_DATASET_URL},
    summary::{churn_split, grouped_counts, values_by_label},
};
use crate::domain::record::{CustomerRecord, NumericFeature};
use crate::domain::traits::RecordSource;
use crate::infra::charts::{self, ChartRenderer, HistogramSpec};

/// Where the data comes from and where outputs go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Local CSV; takes precedence over `url`
    pub csv_path:  Option<PathBuf>,

    /// Remote CSV, downloaded once into `cache_dir`
    pub url:       String,

    /// Download cache; the file is named after the last URL segment
    pub cache_dir: PathBuf,

    /// Charts, metrics.csv and the JSON artifacts are written here
    pub out_dir:   PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path:  None,
            url:       DEFAULT_DATASET_URL.to_string(),
            cache_dir: PathBuf::from("data"),
            out_dir:   PathBuf::from("output"),
        }
    }
}

impl DataConfig {
    pub fn location(&self) -> DataLocation {
        match &self.csv_path {
            Some(path) => DataLocation::Path(path.clone()),
            None       => DataLocation::Url(self.url.clone()),
        }
    }

    pub fn loader(&self) -> CsvLoader {
        CsvLoader::new(self.location(), &self.cache_dir)
    }
}

pub struct ExploreUseCase {
    config: DataConfig,
}

impl ExploreUseCase {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    /// Returns the paths of the charts written
    pub fn execute(&self) -> Result<Vec<PathBuf>> {
        let records  = self.config.loader().load_all()?;
        let renderer = ChartRenderer::new(&self.config.out_dir)?;
        render_descriptive(&records, &renderer)
    }
}

/// Render all six descriptive charts
pub fn render_descriptive(records: &[CustomerRecord], renderer: &ChartRenderer) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(6);

    let (churned, retained) = churn_split(records);
    tracing::info!("{} churned / {} retained customers", churned, retained);
    written.push(renderer.churn_pie(churned, retained)?);

    written.push(renderer.grouped_bars(
        charts::SEX_CHURN,
        "Sex vs Churn Status",
        ["Male", "Female"],
        &grouped_counts(records, |r| r.is_male()),
    )?);

    written.push(renderer.grouped_bars(
        charts::SENIOR_CHURN,
        "Senior vs Churn Status",
        ["Senior", "Non senior"],
        &grouped_counts(records, |r| r.is_senior()),
    )?);

    let histograms = [
        (NumericFeature::Tenure,         charts::TENURE,          "Tenure duration",       "Tenure (months)"),
        (NumericFeature::MonthlyCharges, charts::MONTHLY_CHARGES, "Amount charged monthly", "Amount (USD)"),
        (NumericFeature::TotalCharges,   charts::TOTAL_CHARGES,   "Total amount charged",  "Amount (USD)"),
    ];
    for (feature, file, title, x_label) in histograms {
        let (churned, retained) = values_by_label(records, feature);
        let spec = HistogramSpec { file, title, x_label };
        written.push(renderer.overlaid_histogram(&spec, &churned, &retained)?);
    }

    tracing::info!("Wrote {} descriptive charts to '{}'", written.len(), renderer.out_dir().display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::SAMPLE;
    use std::fs;

    #[test]
    fn test_local_path_wins_over_url() {
        let cfg = DataConfig { csv_path: Some("a.csv".into()), ..DataConfig::default() };
        assert_eq!(cfg.location(), DataLocation::Path("a.csv".into()));
        assert_eq!(
            DataConfig::default().location(),
            DataLocation::Url(DEFAULT_DATASET_URL.to_string())
        );
    }

    #[test]
    fn test_explore_writes_six_charts() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("churn.csv");
        fs::write(&csv, SAMPLE).unwrap();

        let cfg = DataConfig {
            csv_path:  Some(csv),
            cache_dir: dir.path().join("cache"),
            out_dir:   dir.path().join("out"),
            ..DataConfig::default()
        };
        let written = ExploreUseCase::new(cfg).execute().unwrap();
        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|p| p.exists()));
    }
}
