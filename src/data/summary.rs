// ============================================================
// Layer 4 — Descriptive Summaries
// ============================================================
// Groups and counts records for the descriptive charts.
// Everything here is pure; rendering lives in infra::charts.

use crate::domain::record::{ChurnLabel, CustomerRecord, NumericFeature};

/// Counts of (churned, retained) records
pub fn churn_split(records: &[CustomerRecord]) -> (usize, usize) {
    let churned = records.iter().filter(|r| r.label() == ChurnLabel::Churned).count();
    (churned, records.len() - churned)
}

/// Bar-chart counts for one label: how many records of that label
/// satisfy the predicate, and how many do not.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedCounts {
    /// Which bar series these counts belong to
    pub label: ChurnLabel,
    /// Records of `label` for which the predicate held (e.g. Male)
    pub matching: usize,
    /// Records of `label` for which it did not (e.g. Female)
    pub other: usize,
}

/// Split each label's records by `predicate`.
/// Output order is [Churned, Retained], matching the chart legend.
pub fn grouped_counts<F>(records: &[CustomerRecord], predicate: F) -> Vec<GroupedCounts>
where
    F: Fn(&CustomerRecord) -> bool,
{
    [ChurnLabel::Churned, ChurnLabel::Retained]
        .into_iter()
        .map(|label| {
            let (matching, other) = records
                .iter()
                .filter(|r| r.label() == label)
                .fold((0, 0), |(m, o), r| if predicate(r) { (m + 1, o) } else { (m, o + 1) });
            GroupedCounts { label, matching, other }
        })
        .collect()
}

/// Values of a numeric column split by label, missing cells skipped.
/// Returns (churned_values, retained_values).
pub fn values_by_label(records: &[CustomerRecord], feature: NumericFeature) -> (Vec<f64>, Vec<f64>) {
    let mut churned  = Vec::new();
    let mut retained = Vec::new();
    for r in records {
        if let Some(v) = r.numeric(feature) {
            match r.label() {
                ChurnLabel::Churned  => churned.push(v),
                ChurnLabel::Retained => retained.push(v),
            }
        }
    }
    (churned, retained)
}

/// Equal-width bins over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len().max(1) as f64
    }

    /// (lower, upper, count) for each bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        let width = self.bin_width();
        self.counts
            .iter()
            .enumerate()
            .map(move |(i, &c)| (self.min + i as f64 * width, self.min + (i + 1) as f64 * width, c))
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Range covering every value in all series, so overlaid
/// histograms share bin edges. Falls back to [0, 1] when empty.
pub fn shared_range(series: &[&[f64]]) -> (f64, f64) {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if min == max {
        (min, min + 1.0)
    } else {
        (min, max)
    }
}

/// Count `values` into `bins` bins over `range`. The upper edge is
/// inclusive so the maximum lands in the last bin.
pub fn histogram(values: &[f64], bins: usize, range: (f64, f64)) -> Histogram {
    let bins  = bins.max(1);
    let (min, max) = range;
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];

    for &v in values {
        if v < min || v > max || !v.is_finite() {
            continue;
        }
        let idx = if width > 0.0 { ((v - min) / width) as usize } else { 0 };
        counts[idx.min(bins - 1)] += 1;
    }

    Histogram { min, max, counts }
}
