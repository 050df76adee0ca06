use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::encoder::EncodedMatrix;

/// One encoded customer: feature vector plus class index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnSample {
    /// One row of the EncodedMatrix
    pub features: Vec<f32>,
    /// `ChurnLabel::class_index` of the row's label
    pub label:    usize,
}

/// In-memory burn Dataset over encoded customers
pub struct ChurnDataset {
    samples: Vec<ChurnSample>,
}

impl ChurnDataset {
    pub fn new(samples: Vec<ChurnSample>) -> Self { Self { samples } }
}

impl From<&EncodedMatrix> for ChurnDataset {
    fn from(matrix: &EncodedMatrix) -> Self {
        let samples = matrix
            .rows()
            .zip(&matrix.labels)
            .map(|(row, label)| ChurnSample {
                features: row.to_vec(),
                label:    label.class_index(),
            })
            .collect();
        Self::new(samples)
    }
}

/// Split an encoded matrix into owned samples
pub fn samples_from(matrix: &EncodedMatrix) -> Vec<ChurnSample> {
    ChurnDataset::from(matrix).samples
}

impl Dataset<ChurnSample> for ChurnDataset {
    fn get(&self, index: usize) -> Option<ChurnSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
