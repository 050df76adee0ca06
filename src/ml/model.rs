use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Linear, LinearConfig, Relu,
    },
    prelude::*,
    tensor::{activation::softmax, ElementConversion},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct ChurnClassifierConfig {
    pub num_features: usize,
    #[config(default = 32)]
    pub hidden_1: usize,
    #[config(default = 64)]
    pub hidden_2: usize,
    #[config(default = 2)]
    pub num_classes: usize,
}

impl ChurnClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ChurnClassifier<B> {
        ChurnClassifier {
            dense_1:    LinearConfig::new(self.num_features, self.hidden_1).init(device),
            dense_2:    LinearConfig::new(self.hidden_1, self.hidden_2).init(device),
            output:     LinearConfig::new(self.hidden_2, self.num_classes).init(device),
            activation: Relu::new(),
        }
    }
}

/// dense(32, relu) → dense(64, relu) → dense(2, softmax)
///
/// `forward` returns logits; the softmax is applied by `forward_probs`
/// and internally by the cross-entropy loss.
#[derive(Module, Debug)]
pub struct ChurnClassifier<B: Backend> {
    pub dense_1:    Linear<B>,
    pub dense_2:    Linear<B>,
    pub output:     Linear<B>,
    pub activation: Relu,
}

pub struct ClassificationOutput<B: Backend> {
    pub loss:    Tensor<B, 1>,
    pub logits:  Tensor<B, 2>,
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> ChurnClassifier<B> {
    /// features: [batch, num_features] → logits: [batch, num_classes]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.dense_1.forward(features));
        let x = self.activation.forward(self.dense_2.forward(x));
        self.output.forward(x)
    }

    /// Class probabilities, each row sums to 1
    pub fn forward_probs(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(features), 1)
    }

    pub fn forward_classification(
        &self,
        features: Tensor<B, 2>,
        targets:  Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let logits = self.forward(features);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets.clone());
        ClassificationOutput { loss, logits, targets }
    }
}

/// Number of rows whose argmax matches the target
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns [batch, 1]; flatten before comparing with [batch]
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    let correct: i64 = predicted.equal(targets).int().sum().into_scalar().elem::<i64>();
    correct as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn test_output_shape_and_probabilities() {
        let device = Default::default();
        let model: ChurnClassifier<B> = ChurnClassifierConfig::new(5).init(&device);

        let x = Tensor::<B, 2>::zeros([4, 5], &device);
        assert_eq!(model.forward(x.clone()).dims(), [4, 2]);

        let probs = model.forward_probs(x);
        let sums: Vec<f32> = probs.sum_dim(1).into_data().iter::<f32>().collect();
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_layer_sizes() {
        let device = Default::default();
        let model: ChurnClassifier<B> = ChurnClassifierConfig::new(7).init(&device);
        assert_eq!(model.dense_1.weight.dims(), [7, 32]);
        assert_eq!(model.dense_2.weight.dims(), [32, 64]);
        assert_eq!(model.output.weight.dims(), [64, 2]);
    }

    #[test]
    fn test_count_correct() {
        let device = Default::default();
        let logits  = Tensor::<B, 2>::from_floats([[2.0, 1.0], [0.0, 3.0], [5.0, -1.0]], &device);
        let targets = Tensor::<B, 1, Int>::from_ints([0, 1, 1], &device);
        assert_eq!(count_correct(logits, targets), 2);
    }
}
