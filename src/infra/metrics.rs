// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Writes one CSV row per epoch to {out_dir}/metrics.csv:
//
//   epoch,loss,val_loss,accuracy,val_accuracy
//   1,0.523100,0.498700,0.741000,0.762000
//   ...
//
// Each run starts a fresh file. Rows are flushed as they are
// written so the file can be tailed during training.

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use crate::domain::traits::TrainingObserver;
use crate::ml::trainer::EpochMetrics;

pub const METRICS_FILE: &str = "metrics.csv";

pub struct MetricsLogger {
    csv_path: PathBuf,
    writer:   csv::Writer<File>,
}

impl MetricsLogger {
    /// Create {dir}/metrics.csv, replacing any previous run's file
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(METRICS_FILE);
        let writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create metrics CSV '{}'", csv_path.display()))?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path, writer })
    }

    pub fn log(&mut self, m: &EpochMetrics) -> Result<()> {
        self.writer.serialize(m)?;
        self.writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl TrainingObserver for MetricsLogger {
    fn on_epoch_end(&mut self, metrics: &EpochMetrics, _history: &[EpochMetrics]) -> Result<()> {
        self.log(metrics)
    }
}

/// Read a metrics CSV back
#[cfg(test)]
pub fn read_metrics(path: impl AsRef<Path>) -> Result<Vec<EpochMetrics>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open metrics CSV '{}'", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<EpochMetrics>, _>>()
        .with_context(|| format!("Malformed metrics CSV '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_written_per_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = MetricsLogger::new(dir.path()).unwrap();

        let rows = vec![
            EpochMetrics { epoch: 1, loss: 0.6, val_loss: 0.55, accuracy: 0.7, val_accuracy: 0.72 },
            EpochMetrics { epoch: 2, loss: 0.5, val_loss: 0.52, accuracy: 0.75, val_accuracy: 0.74 },
        ];
        for (i, m) in rows.iter().enumerate() {
            logger.on_epoch_end(m, &rows[..=i]).unwrap();
        }

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        assert!(text.starts_with("epoch,loss,val_loss,accuracy,val_accuracy"));
        assert_eq!(read_metrics(logger.csv_path()).unwrap(), rows);
    }

    #[test]
    fn test_new_run_replaces_old_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut first = MetricsLogger::new(dir.path()).unwrap();
            first
                .log(&EpochMetrics { epoch: 1, loss: 1.0, val_loss: 1.0, accuracy: 0.5, val_accuracy: 0.5 })
                .unwrap();
        }
        let second = MetricsLogger::new(dir.path()).unwrap();
        assert!(read_metrics(second.csv_path()).unwrap().is_empty());
    }
}
