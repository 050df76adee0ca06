// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Output side of the pipeline:
//
//   charts.rs    — plotters SVG rendering of every chart, plus the
//                  LiveCurves observer that redraws loss.svg per epoch
//
//   metrics.rs   — per-epoch metrics CSV (a TrainingObserver)
//
//   artifacts.rs — run_config.json / evaluation.json via serde_json

/// SVG charts
pub mod charts;

/// Training metrics CSV logger
pub mod metrics;

/// JSON run artifacts
pub mod artifacts;
