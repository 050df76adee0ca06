// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fixed recipe: Adam(lr) + cross-entropy, `epochs` passes,
// `batch_size` samples per step, last `validation_split` of the
// training partition held out for per-epoch validation.
//
//   - Training runs on B (an AutodiffBackend) for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - the validation batcher therefore uses B::InnerBackend
//
// After every epoch the metrics go to each TrainingObserver.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    backend::{Autodiff, NdArray},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::ChurnBatcher,
    dataset::{samples_from, ChurnDataset},
    encoder::EncodedMatrix,
    splitter::split_ordered,
};
use crate::domain::traits::TrainingObserver;
use crate::ml::model::{count_correct, ChurnClassifier, ChurnClassifierConfig};

pub type TrainBackend = Autodiff<NdArray>;
pub type EvalBackend  = NdArray;

/// Loss and accuracy after one epoch. Validation values are NaN
/// when the validation split is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch:        usize,
    /// Mean training loss over every sample seen this epoch
    pub loss:         f64,
    /// Mean loss on the validation tail
    pub val_loss:     f64,
    /// Training accuracy in [0, 1]
    pub accuracy:     f64,
    /// Validation accuracy in [0, 1]
    pub val_accuracy: f64,
}

/// Final weights, moved off the autodiff backend, plus the epoch log
pub struct TrainedModel<B: Backend> {
    pub model:   ChurnClassifier<B>,
    pub history: Vec<EpochMetrics>,
}

/// Train on the CPU NdArray backend
pub fn run_training(
    cfg:       &TrainConfig,
    train:     &EncodedMatrix,
    observers: &mut [&mut dyn TrainingObserver],
) -> Result<TrainedModel<EvalBackend>> {
    let device = Default::default();
    train_on::<TrainBackend>(cfg, train, device, observers)
}

pub fn train_on<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    train:     &EncodedMatrix,
    device:    B::Device,
    observers: &mut [&mut dyn TrainingObserver],
) -> Result<TrainedModel<B::InnerBackend>> {
    ensure!(!train.is_empty(), "Training partition is empty");
    ensure!(train.n_cols > 0, "Training matrix has no feature columns");
    ensure!(cfg.batch_size > 0, "batch size must be positive");
    ensure!(
        (0.0..1.0).contains(&cfg.validation_split),
        "validation split must be in [0, 1), got {}",
        cfg.validation_split
    );

    B::seed(cfg.seed);

    // ── Validation hold-out: last rows, taken before any shuffling ────────────
    let (fit_samples, val_samples) = split_ordered(samples_from(train), cfg.validation_split);
    ensure!(!fit_samples.is_empty(), "Nothing left to train on after the validation split");
    tracing::info!(
        "Training on {} samples, validating on {}",
        fit_samples.len(),
        val_samples.len()
    );

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: ChurnClassifier<B> = ChurnClassifierConfig::new(train.n_cols).init(&device);
    tracing::info!("Model ready: {} → 32 → 64 → 2", train.n_cols);

    let mut optim = AdamConfig::new().with_epsilon(1e-7).init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ChurnBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(ChurnDataset::new(fit_samples));

    let val_loader = DataLoaderBuilder::new(ChurnBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(ChurnDataset::new(val_samples));

    let mut history: Vec<EpochMetrics> = Vec::with_capacity(cfg.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let n = batch.targets.dims()[0];
            let output = model.forward_classification(batch.features, batch.targets);

            loss_sum += output.loss.clone().into_scalar().elem::<f64>() * n as f64;
            correct  += count_correct(output.logits.clone(), output.targets.clone());
            seen     += n;

            let grads = output.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let mut val_loss_sum = 0.0f64;
        let mut val_correct  = 0usize;
        let mut val_seen     = 0usize;

        for batch in val_loader.iter() {
            let n = batch.targets.dims()[0];
            let output = model_valid.forward_classification(batch.features, batch.targets);

            val_loss_sum += output.loss.into_scalar().elem::<f64>() * n as f64;
            val_correct  += count_correct(output.logits, output.targets);
            val_seen     += n;
        }

        let metrics = EpochMetrics {
            epoch,
            loss:         mean(loss_sum, seen),
            val_loss:     mean(val_loss_sum, val_seen),
            accuracy:     mean(correct as f64, seen),
            val_accuracy: mean(val_correct as f64, val_seen),
        };

        tracing::info!(
            "Epoch {:>3}/{} | loss={:.4} | val_loss={:.4} | acc={:.1}% | val_acc={:.1}%",
            epoch,
            cfg.epochs,
            metrics.loss,
            metrics.val_loss,
            metrics.accuracy * 100.0,
            metrics.val_accuracy * 100.0,
        );

        history.push(metrics.clone());
        for observer in observers.iter_mut() {
            observer.on_epoch_end(&metrics, &history)?;
        }
    }

    tracing::info!("Training complete");
    Ok(TrainedModel { model: model.valid(), history })
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}
