// ============================================================
// Layer 4 — Churn Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks N ChurnSamples into
//   features: [N, n_features] float tensor
//   targets:  [N]             int tensor of class indices
//
// Every sample has the same width because they all went through
// the same FeatureEncoder.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ChurnSample;

// ─── ChurnBatch ───────────────────────────────────────────────────────────────
/// A batch of encoded customers ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ChurnBatch<B: Backend> {
    /// Encoded feature rows — shape: [batch_size, n_features]
    pub features: Tensor<B, 2>,

    /// Class index per row — shape: [batch_size]
    /// 0 = Retained, 1 = Churned
    pub targets:  Tensor<B, 1, Int>,
}

// ─── ChurnBatcher ─────────────────────────────────────────────────────────────
/// Holds the device so tensors are created where the model lives.
#[derive(Clone, Debug)]
pub struct ChurnBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ChurnBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ChurnSample, ChurnBatch<B>> for ChurnBatcher<B> {
    fn batch(&self, items: Vec<ChurnSample>) -> ChurnBatch<B> {
        let batch_size = items.len();
        let n_features = items.first().map(|s| s.features.len()).unwrap_or(0);

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let targets: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let features = Tensor::<B, 2>::from_data(
            TensorData::new(flat, [batch_size, n_features]),
            &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        ChurnBatch { features, targets }
    }
}
