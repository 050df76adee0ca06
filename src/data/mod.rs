// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Raw CSV all the way to tensor batches:
//
//   customer-churn.csv
//       │
//       ▼
//   CsvLoader          → downloads / reads and parses rows
//       │
//       ├──▶ summary   → counts and histograms for the charts
//       ▼
//   FeatureEncoder     → one-hot + min-max, ordered train/test split
//       │
//       ▼
//   ChurnDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   ChurnBatcher       → stacks samples into tensor batches

/// Fetches and parses the churn CSV
pub mod loader;

/// Aggregations behind the descriptive charts
pub mod summary;

/// One-hot encoding, min-max scaling and train/test partitioning
pub mod encoder;

/// Ordered (no-shuffle) head/tail splitting
pub mod splitter;

/// Implements Burn's Dataset trait for encoded customers
pub mod dataset;

/// Implements Burn's Batcher trait
pub mod batcher;
