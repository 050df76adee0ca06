// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between the layers. The application layer talks to
// these traits, never to the concrete CSV loader or CSV logger.

use anyhow::Result;

use crate::domain::record::CustomerRecord;
use crate::ml::trainer::EpochMetrics;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the full set of customer records.
///
/// Implementations:
///   - CsvLoader → remote URL (cached on disk) or local CSV file
pub trait RecordSource {
    fn load_all(&self) -> Result<Vec<CustomerRecord>>;
}

// ─── TrainingObserver ─────────────────────────────────────────────────────────
/// Receives metrics at the end of every epoch.
///
/// Implementations:
///   - MetricsLogger → appends a row to metrics.csv
///   - LiveCurves    → re-renders loss.svg
pub trait TrainingObserver {
    fn on_epoch_end(&mut self, metrics: &EpochMetrics, history: &[EpochMetrics]) -> Result<()>;
}
