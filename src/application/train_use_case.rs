// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full pipeline in order:
//
//   Step 1: Load customer records       (Layer 4 - data)
//   Step 2: Descriptive charts          (Layer 6 - infra, optional)
//   Step 3: Encode + ordered split      (Layer 4 - data)
//   Step 4: Save run config             (Layer 6 - infra)
//   Step 5: Train with observers        (Layer 5 - ml)
//   Step 6: Evaluate on the test split  (Layer 5 - ml)
//   Step 7: Confusion matrix + JSON     (Layer 6 - infra)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::application::explore_use_case::{render_descriptive, DataConfig};
use crate::data::encoder::{prepare_partitions, ScalingFit};
use crate::domain::traits::{RecordSource, TrainingObserver};
use crate::infra::{
    artifacts::RunArtifacts,
    charts::{ChartRenderer, LiveCurves},
    metrics::MetricsLogger,
};
use crate::ml::{
    evaluator::{evaluate, Evaluation},
    trainer::{run_training, EpochMetrics},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Defaults reproduce the fixed recipe: 32 epochs, batch 32, Adam 1e-3,
// 10% test split, 10% validation split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Input location and output directory
    pub data:             DataConfig,

    /// Full passes over the training rows
    pub epochs:           usize,

    /// Samples per Adam step
    pub batch_size:       usize,

    /// Adam step size
    pub learning_rate:    f64,

    /// Fraction of rows, taken from the end, held out for evaluation
    pub test_size:        f64,

    /// Fraction of the training rows, taken from the end, used for
    /// per-epoch validation
    pub validation_split: f64,

    /// Seeds weight initialisation and batch shuffling
    pub seed:             u64,

    /// Which rows the min-max scalers are fitted on
    pub scaling:          ScalingFit,

    /// Write metrics and JSON only, no SVG charts
    pub skip_charts:      bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data:             DataConfig::default(),
            epochs:           32,
            batch_size:       32,
            learning_rate:    1e-3,
            test_size:        0.1,
            validation_split: 0.1,
            seed:             42,
            scaling:          ScalingFit::TrainOnly,
            skip_charts:      false,
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// One entry per epoch, in order
    pub history:    Vec<EpochMetrics>,
    /// Test-partition results
    pub evaluation: Evaluation,
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Load records ──────────────────────────────────────────────
        let records = cfg.data.loader().load_all()?;

        // ── Step 2: Descriptive charts (side path) ────────────────────────────
        let renderer = ChartRenderer::new(&cfg.data.out_dir)?;
        if !cfg.skip_charts {
            render_descriptive(&records, &renderer)?;
        }

        // ── Step 3: Encode and split ──────────────────────────────────────────
        let parts = prepare_partitions(&records, cfg.test_size, cfg.scaling)?;

        // ── Step 4: Save config ───────────────────────────────────────────────
        let artifacts = RunArtifacts::new(&cfg.data.out_dir)?;
        artifacts.save_config(cfg)?;

        // ── Step 5: Train ─────────────────────────────────────────────────────
        let mut logger = MetricsLogger::new(&cfg.data.out_dir)?;
        let mut live   = LiveCurves::new(&renderer);
        let trained = if cfg.skip_charts {
            run_training(cfg, &parts.train, &mut [&mut logger as &mut dyn TrainingObserver])?
        } else {
            run_training(cfg, &parts.train, &mut [&mut logger, &mut live])?
        };
        tracing::info!("Metrics written to '{}'", logger.csv_path().display());

        // ── Step 6: Evaluate ──────────────────────────────────────────────────
        let device = Default::default();
        let evaluation = evaluate(&trained.model, &parts.test, &device)?;

        // ── Step 7: Confusion matrix + evaluation JSON ────────────────────────
        if !cfg.skip_charts {
            renderer.confusion_matrix(&evaluation.confusion, &evaluation.tick_labels)?;
        }
        artifacts.save_evaluation(&evaluation)?;

        Ok(TrainReport { history: trained.history, evaluation })
    }
}
