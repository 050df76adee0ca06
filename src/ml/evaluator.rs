// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Forward passes over the held-out partition:
//   - mean cross-entropy loss on the logits
//   - argmax of the softmax probabilities vs true classes
//     → confusion matrix and accuracy
//
// Reference: Burn Book §3 (Building Blocks)

use anyhow::{ensure, Result};
use burn::{prelude::*, tensor::ElementConversion};
use serde::{Deserialize, Serialize};

use crate::data::encoder::EncodedMatrix;
use crate::domain::record::ChurnLabel;
use crate::ml::model::ChurnClassifier;

/// Predicted vs actual class counts for the test partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// `counts[actual][predicted]`, square with one row per class
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[usize], predicted: &[usize], num_classes: usize) -> Result<Self> {
        ensure!(
            actual.len() == predicted.len(),
            "label count {} != prediction count {}",
            actual.len(),
            predicted.len()
        );
        let mut counts = vec![vec![0usize; num_classes]; num_classes];
        for (&a, &p) in actual.iter().zip(predicted) {
            ensure!(a < num_classes && p < num_classes, "class index out of range: ({a}, {p})");
            counts[a][p] += 1;
        }
        Ok(Self { counts })
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.num_classes()).map(|i| self.counts[i][i]).sum()
    }
}

#[cfg(test)]
impl ConfusionMatrix {
    /// (rows, columns)
    pub fn dims(&self) -> (usize, usize) {
        (self.counts.len(), self.counts.first().map_or(0, |r| r.len()))
    }
}

/// Everything reported about the held-out partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mean cross-entropy over the test rows
    pub loss:        f64,
    /// Fraction of test rows whose predicted class is correct
    pub accuracy:    f64,
    /// Size of the test partition
    pub test_rows:   usize,
    pub confusion:   ConfusionMatrix,
    /// Class names in class-index order: ["Retained", "Churned"]
    pub tick_labels: Vec<String>,
}

pub fn evaluate<B: Backend>(
    model:  &ChurnClassifier<B>,
    test:   &EncodedMatrix,
    device: &B::Device,
) -> Result<Evaluation> {
    ensure!(!test.is_empty(), "Test partition is empty; lower --test-size or add rows");

    let n = test.n_rows();
    let features = Tensor::<B, 2>::from_data(
        TensorData::new(test.values.clone(), [n, test.n_cols]),
        device,
    );
    let actual: Vec<usize> = test.labels.iter().map(|l| l.class_index()).collect();
    let targets_i32: Vec<i32> = actual.iter().map(|&c| c as i32).collect();
    let targets = Tensor::<B, 1, Int>::from_ints(targets_i32.as_slice(), device);

    let output = model.forward_classification(features.clone(), targets);
    let loss: f64 = output.loss.into_scalar().elem::<f64>();

    let predicted: Vec<usize> = model
        .forward_probs(features)
        .argmax(1)
        .flatten::<1>(0, 1)
        .into_data()
        .iter::<i64>()
        .map(|c| c as usize)
        .collect();

    let confusion = ConfusionMatrix::from_predictions(&actual, &predicted, ChurnLabel::COUNT)?;
    let accuracy  = confusion.correct() as f64 / confusion.total() as f64;

    tracing::info!("Test loss={:.4} accuracy={:.1}% on {} rows", loss, accuracy * 100.0, n);
    tracing::debug!("Confusion matrix (actual x predicted): {:?}", confusion.counts);

    Ok(Evaluation {
        loss,
        accuracy,
        test_rows: n,
        confusion,
        tick_labels: ChurnLabel::ALL.iter().map(|l| l.display_name().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::ChurnClassifierConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_confusion_matrix_counts() {
        let actual    = [0, 0, 1, 1, 1];
        let predicted = [0, 1, 1, 1, 0];
        let cm = ConfusionMatrix::from_predictions(&actual, &predicted, 2).unwrap();
        assert_eq!(cm.counts, vec![vec![1, 1], vec![1, 2]]);
        assert_eq!(cm.dims(), (2, 2));
        assert_eq!(cm.total(), 5);
        assert_eq!(cm.correct(), 3);
    }

    #[test]
    fn test_confusion_matrix_rejects_mismatch() {
        assert!(ConfusionMatrix::from_predictions(&[0, 1], &[0], 2).is_err());
        assert!(ConfusionMatrix::from_predictions(&[2], &[0], 2).is_err());
    }

    #[test]
    fn test_evaluate_shapes() {
        let device = Default::default();
        let model: ChurnClassifier<NdArray> = ChurnClassifierConfig::new(3).init(&device);
        let test = EncodedMatrix {
            n_cols: 3,
            values: vec![0.0, 0.5, 1.0, 1.0, 0.0, 0.2, 0.3, 0.3, 0.3],
            labels: vec![ChurnLabel::Retained, ChurnLabel::Churned, ChurnLabel::Retained],
        };

        let eval = evaluate(&model, &test, &device).unwrap();
        assert_eq!(eval.confusion.dims(), (ChurnLabel::COUNT, ChurnLabel::COUNT));
        assert_eq!(eval.confusion.total(), 3);
        assert!(eval.loss.is_finite());
        assert!((0.0..=1.0).contains(&eval.accuracy));
        assert_eq!(eval.tick_labels, vec!["Retained", "Churned"]);
    }

    #[test]
    fn test_accuracy_matches_confusion_diagonal() {
        let device = Default::default();
        let model: ChurnClassifier<NdArray> = ChurnClassifierConfig::new(2).init(&device);
        let test = EncodedMatrix {
            n_cols: 2,
            values: vec![0.0, 1.0, 1.0, 0.0, 0.5, 0.5, 0.9, 0.1],
            labels: vec![ChurnLabel::Churned, ChurnLabel::Retained, ChurnLabel::Churned, ChurnLabel::Retained],
        };

        let eval = evaluate(&model, &test, &device).unwrap();
        let expected = eval.confusion.correct() as f64 / 4.0;
        assert_eq!(eval.accuracy, expected);
        assert_eq!(eval.test_rows, 4);
    }

    #[test]
    fn test_evaluate_rejects_empty_partition() {
        let device = Default::default();
        let model: ChurnClassifier<NdArray> = ChurnClassifierConfig::new(2).init(&device);
        let empty = EncodedMatrix { n_cols: 2, values: vec![], labels: vec![] };
        assert!(evaluate(&model, &empty, &device).is_err());
    }
}
