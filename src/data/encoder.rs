// ============================================================
// Layer 4 — Feature Encoder
// ============================================================
// Turns CustomerRecords into a dense f32 matrix:
//
//   [ scaled numeric columns | one-hot block per categorical feature ]
//
// Category vocabularies are fitted on every record (first-seen
// order) so train and test rows share the same column layout.
// Blank categorical cells get their own slot (keyed `None`) instead
// of reusing category 0.
//
// Numeric columns are min-max scaled. The scaler is fitted on the
// training partition by default; ScalingFit::FullDataset fits it
// on train + test, which leaks test statistics into training.
// Scaled values are clamped to [0, 1].
//
// Reference: Rust Book §8 (Vectors), §13 (Iterators and Closures)

use anyhow::{anyhow, ensure, Result};
use serde::{Deserialize, Serialize};

use crate::data::splitter::split_index;
use crate::domain::record::{CategoricalFeature, ChurnLabel, CustomerRecord, NumericFeature};

/// Display name of the blank-cell slot in column names and errors
pub const MISSING_CATEGORY: &str = "<missing>";

/// Value used for blank numeric cells before scaling.
/// Blank TotalCharges only occur for customers with zero tenure.
const NUMERIC_IMPUTE: f64 = 0.0;

/// Which rows the min-max scaler is fitted on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalingFit {
    #[default]
    TrainOnly,
    FullDataset,
}

// ─── CategoryVocabulary ───────────────────────────────────────────────────────
/// Distinct values of one categorical column, in one-hot slot order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    /// Column this vocabulary was fitted on
    pub feature:    CategoricalFeature,
    /// `None` is the slot for blank cells; it can never equal a real value
    pub categories: Vec<Option<String>>,
}

impl CategoryVocabulary {
    /// Collect distinct values in first-seen order
    pub fn fit(records: &[CustomerRecord], feature: CategoricalFeature) -> Self {
        let mut categories: Vec<Option<String>> = Vec::new();
        for r in records {
            let value = r.categorical(feature);
            if !categories.iter().any(|c| c.as_deref() == value) {
                categories.push(value.map(str::to_string));
            }
        }
        Self { feature, categories }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn index_of(&self, value: Option<&str>) -> Option<usize> {
        self.categories.iter().position(|c| c.as_deref() == value)
    }

    /// Append the one-hot block for `value` to `out`
    fn encode_into(&self, value: Option<&str>, out: &mut Vec<f32>) -> Result<()> {
        let idx = self.index_of(value).ok_or_else(|| {
            anyhow!(
                "Unknown {} category '{}'",
                self.feature.column_name(),
                value.unwrap_or(MISSING_CATEGORY)
            )
        })?;
        let start = out.len();
        out.resize(start + self.len(), 0.0);
        out[start + idx] = 1.0;
        Ok(())
    }
}

// ─── MinMaxScaler ─────────────────────────────────────────────────────────────
/// Per-column min-max scaling fitted on one set of rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub feature: NumericFeature,
    /// Smallest fitted value (blank cells count as the imputed 0.0)
    pub min:     f64,
    /// Largest fitted value
    pub max:     f64,
}

impl MinMaxScaler {
    pub fn fit(records: &[CustomerRecord], feature: NumericFeature) -> Self {
        let (min, max) = records
            .iter()
            .map(|r| r.numeric(feature).unwrap_or(NUMERIC_IMPUTE))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self { feature, min, max }
    }

    /// (v - min) / (max - min), clamped to [0, 1]; a constant column maps to 0
    pub fn transform(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if !range.is_finite() || range <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }
}

// ─── EncodedMatrix ────────────────────────────────────────────────────────────
/// Row-major feature matrix with one label per row
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMatrix {
    /// Width of every row, equal to `FeatureEncoder::width`
    pub n_cols: usize,
    /// `n_rows * n_cols` values, every one in [0, 1]
    pub values: Vec<f32>,
    /// Target for each row, same order as the rows
    pub labels: Vec<ChurnLabel>,
}

impl EncodedMatrix {
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.n_rows()).map(move |i| self.row(i))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ─── FeatureEncoder ───────────────────────────────────────────────────────────
/// Fitted column layout shared by the train and test partitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    /// One scaler per `NumericFeature::ALL` entry, in order
    pub scalers:      Vec<MinMaxScaler>,
    /// One vocabulary per `CategoricalFeature::ALL` entry, in order
    pub vocabularies: Vec<CategoryVocabulary>,
}

impl FeatureEncoder {
    /// Fit vocabularies on `all` and scalers on `scaling_rows`
    pub fn fit(all: &[CustomerRecord], scaling_rows: &[CustomerRecord]) -> Result<Self> {
        ensure!(!all.is_empty(), "Cannot fit encoder on an empty dataset");
        ensure!(!scaling_rows.is_empty(), "Cannot fit min-max scaling on zero rows");

        let scalers = NumericFeature::ALL
            .iter()
            .map(|&f| MinMaxScaler::fit(scaling_rows, f))
            .collect();
        let vocabularies = CategoricalFeature::ALL
            .iter()
            .map(|&f| CategoryVocabulary::fit(all, f))
            .collect();

        Ok(Self { scalers, vocabularies })
    }

    /// Total number of encoded columns
    pub fn width(&self) -> usize {
        self.scalers.len() + self.vocabularies.iter().map(|v| v.len()).sum::<usize>()
    }

    /// Column names in layout order, e.g. "tenure", "Contract=One year"
    pub fn column_names(&self) -> Vec<String> {
        let numeric = self.scalers.iter().map(|s| s.feature.column_name().to_string());
        let one_hot = self.vocabularies.iter().flat_map(|v| {
            v.categories.iter().map(move |c| {
                format!("{}={}", v.feature.column_name(), c.as_deref().unwrap_or(MISSING_CATEGORY))
            })
        });
        numeric.chain(one_hot).collect()
    }

    fn encode_into(&self, record: &CustomerRecord, out: &mut Vec<f32>) -> Result<usize> {
        let mut imputed = 0;
        for scaler in &self.scalers {
            let value = record.numeric(scaler.feature).unwrap_or_else(|| {
                imputed += 1;
                NUMERIC_IMPUTE
            });
            out.push(scaler.transform(value));
        }
        for vocab in &self.vocabularies {
            vocab.encode_into(record.categorical(vocab.feature), out)?;
        }
        Ok(imputed)
    }

    pub fn transform(&self, records: &[CustomerRecord]) -> Result<EncodedMatrix> {
        let n_cols = self.width();
        let mut values  = Vec::with_capacity(records.len() * n_cols);
        let mut imputed = 0usize;

        for record in records {
            imputed += self.encode_into(record, &mut values)?;
        }

        if imputed > 0 {
            tracing::warn!("Imputed {} blank numeric cells with {}", imputed, NUMERIC_IMPUTE);
        }

        Ok(EncodedMatrix {
            n_cols,
            values,
            labels: records.iter().map(|r| r.label()).collect(),
        })
    }
}

#[cfg(test)]
impl FeatureEncoder {
    /// (start, len) column span of each one-hot block
    pub fn one_hot_spans(&self) -> Vec<(CategoricalFeature, usize, usize)> {
        let mut start = self.scalers.len();
        self.vocabularies
            .iter()
            .map(|v| {
                let span = (v.feature, start, v.len());
                start += v.len();
                span
            })
            .collect()
    }
}

// ─── Partitions ───────────────────────────────────────────────────────────────
/// Train / test matrices sharing one encoder
#[derive(Debug, Clone)]
pub struct EncodedPartitions {
    pub encoder: FeatureEncoder,
    pub train:   EncodedMatrix,
    pub test:    EncodedMatrix,
}

/// Split `records` in order at floor((1 - test_fraction) * n), fit the
/// encoder, and encode both sides.
pub fn prepare_partitions(
    records:       &[CustomerRecord],
    test_fraction: f64,
    scaling:       ScalingFit,
) -> Result<EncodedPartitions> {
    ensure!(
        (0.0..1.0).contains(&test_fraction),
        "test fraction must be in [0, 1), got {test_fraction}"
    );

    let split_at = split_index(records.len(), test_fraction);
    let (train_rows, test_rows) = records.split_at(split_at);
    ensure!(!train_rows.is_empty(), "Training partition is empty");

    let scaling_rows = match scaling {
        ScalingFit::TrainOnly   => train_rows,
        ScalingFit::FullDataset => records,
    };
    let encoder = FeatureEncoder::fit(records, scaling_rows)?;

    let train = encoder.transform(train_rows)?;
    let test  = encoder.transform(test_rows)?;

    tracing::info!(
        "Encoded {} features: {} train rows, {} test rows (scaling fit: {:?})",
        encoder.width(),
        train.n_rows(),
        test.n_rows(),
        scaling,
    );
    tracing::debug!("Feature columns: {:?}", encoder.column_names());

    Ok(EncodedPartitions { encoder, train, test })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_records, tests::HEADER};
    use crate::domain::record::fixtures::{record, synthetic};

    #[test]
    fn test_one_hot_blocks_sum_to_one() {
        let records = synthetic(60, 7);
        let parts   = prepare_partitions(&records, 0.1, ScalingFit::TrainOnly).unwrap();
        let spans   = parts.encoder.one_hot_spans();

        for row in parts.train.rows().chain(parts.test.rows()) {
            for &(_, start, len) in &spans {
                let sum: f32 = row[start..start + len].iter().sum();
                assert_eq!(sum, 1.0);
            }
        }
    }

    #[test]
    fn test_every_column_in_unit_range() {
        let records = synthetic(80, 11);
        for scaling in [ScalingFit::TrainOnly, ScalingFit::FullDataset] {
            let parts = prepare_partitions(&records, 0.2, scaling).unwrap();
            assert!(parts.train.values.iter().all(|v| (0.0..=1.0).contains(v)));
            assert!(parts.test.values.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_partition_sizes_add_up() {
        let records = synthetic(47, 3);
        let parts   = prepare_partitions(&records, 0.1, ScalingFit::TrainOnly).unwrap();
        assert_eq!(parts.train.n_rows(), 42);
        assert_eq!(parts.train.n_rows() + parts.test.n_rows(), records.len());
        assert_eq!(parts.train.n_cols, parts.test.n_cols);
    }

    #[test]
    fn test_first_seen_category_order() {
        let mut a = record("a", ChurnLabel::Retained);
        a.contract = Some("Two year".into());
        let b = record("b", ChurnLabel::Retained);
        let mut c = record("c", ChurnLabel::Retained);
        c.contract = Some("One year".into());

        let vocab = CategoryVocabulary::fit(&[a, b, c], CategoricalFeature::Contract);
        let names: Vec<_> = vocab.categories.iter().map(|c| c.as_deref()).collect();
        assert_eq!(names, vec![Some("Two year"), Some("Month-to-month"), Some("One year")]);
    }

    #[test]
    fn test_missing_category_has_its_own_slot() {
        let a = record("a", ChurnLabel::Retained);
        let mut b = record("b", ChurnLabel::Churned);
        b.tech_support = None;

        let vocab = CategoryVocabulary::fit(&[a, b], CategoricalFeature::TechSupport);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.index_of(Some("No")), Some(0));
        assert_eq!(vocab.index_of(None), Some(1));
    }

    #[test]
    fn test_literal_missing_name_does_not_share_blank_slot() {
        let mut a = record("a", ChurnLabel::Retained);
        a.tech_support = Some(MISSING_CATEGORY.into());
        let mut b = record("b", ChurnLabel::Churned);
        b.tech_support = None;

        let vocab = CategoryVocabulary::fit(&[a, b], CategoricalFeature::TechSupport);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.index_of(Some(MISSING_CATEGORY)), Some(0));
        assert_eq!(vocab.index_of(None), Some(1));
    }

    #[test]
    fn test_nan_and_inf_cells_are_imputed() {
        let csv = format!(
            "{HEADER}\n\
A,Male,0,Yes,No,5,Yes,No,DSL,No,No,No,No,No,No,One year,No,Mailed check,NaN,20,No\n\
B,Male,0,Yes,No,5,Yes,No,DSL,No,No,No,No,No,No,One year,No,Mailed check,30,inf,Yes\n\
C,Male,0,Yes,No,5,Yes,No,DSL,No,No,No,No,No,No,One year,No,Mailed check,60,50,No\n"
        );
        let records = parse_records(csv.as_bytes()).unwrap();
        let encoder = FeatureEncoder::fit(&records, &records).unwrap();
        let matrix  = encoder.transform(&records).unwrap();

        assert!(matrix.values.iter().all(|v| (0.0..=1.0).contains(v)));
        // MonthlyCharges: NaN imputed to 0, range [0, 60]
        assert_eq!(matrix.row(0)[2], 0.0);
        assert_eq!(matrix.row(1)[2], 0.5);
        // TotalCharges: inf imputed to 0, range [0, 50], column not wiped out
        assert_eq!(matrix.row(0)[3], 0.4);
        assert_eq!(matrix.row(1)[3], 0.0);
        assert_eq!(matrix.row(2)[3], 1.0);
    }

    #[test]
    fn test_train_only_scaling_ignores_test_rows() {
        let mut records: Vec<_> = (0..10)
            .map(|i| {
                let mut r = record(&format!("r{i}"), ChurnLabel::Retained);
                r.tenure = Some(i as f64);
                r
            })
            .collect();
        // Last row lands in the test partition with an out-of-range tenure
        records[9].tenure = Some(100.0);

        let parts  = prepare_partitions(&records, 0.1, ScalingFit::TrainOnly).unwrap();
        let tenure = &parts.encoder.scalers[1];
        assert_eq!(tenure.feature, NumericFeature::Tenure);
        assert_eq!((tenure.min, tenure.max), (0.0, 8.0));
        assert_eq!(parts.test.row(0)[1], 1.0);

        let leaky = prepare_partitions(&records, 0.1, ScalingFit::FullDataset).unwrap();
        assert_eq!(leaky.encoder.scalers[1].max, 100.0);
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let scaler = MinMaxScaler { feature: NumericFeature::Tenure, min: 5.0, max: 5.0 };
        assert_eq!(scaler.transform(5.0), 0.0);
    }

    #[test]
    fn test_blank_numeric_is_imputed() {
        let a = record("a", ChurnLabel::Retained);
        let mut b = record("b", ChurnLabel::Churned);
        b.total_charges = None;

        let encoder = FeatureEncoder::fit(&[a.clone(), b.clone()], &[a, b.clone()]).unwrap();
        let matrix  = encoder.transform(&[b]).unwrap();
        // TotalCharges column: imputed 0 is the fitted minimum
        assert_eq!(matrix.row(0)[3], 0.0);
    }

    #[test]
    fn test_column_names_match_width() {
        let records = synthetic(30, 5);
        let encoder = FeatureEncoder::fit(&records, &records).unwrap();
        let names   = encoder.column_names();
        assert_eq!(names.len(), encoder.width());
        assert_eq!(names[0], "SeniorCitizen");
        assert!(names.iter().any(|n| n == "Contract=Two year"));
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let records = synthetic(10, 1);
        assert!(prepare_partitions(&records, 1.0, ScalingFit::TrainOnly).is_err());
    }
}
