use burn::{
    module::Module,
    nn::{conv::Conv2d, loss::CrossEntropyLossConfig, Dropout, Embedding, Linear},
    tensor::{
        activation::{relu, softmax},
        backend::Backend,
        Int, Tensor,
    },
    train::ClassificationOutput,
};

use crate::pipelines::text_classification::batcher::Train;

/// Convolutional text classifier over word embeddings
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Word embeddings, `[vocab_size, embedding_size]`
    pub embedding: Embedding<B>,

    /// One convolution per filter size, each spanning the full embedding width
    pub convolutions: Vec<Conv2d<B>>,

    /// Dropout over the pooled features
    pub dropout: Dropout,

    /// Linear layer for classification
    pub output: Linear<B>,

    /// Total number of classes
    pub n_classes: usize,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Replace the embedding weights, e.g. with pretrained word vectors
    pub fn with_embedding(mut self, weights: Tensor<B, 2>) -> Self {
        self.embedding.weight = self
            .embedding
            .weight
            .map(move |_| weights.clone().require_grad());

        self
    }

    /// Class scores before the softmax, `[batch_size, n_classes]`
    pub fn logits(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, seq_length] = tokens.dims();

        let embedded = self.embedding.forward(tokens);
        let [_, _, embedding_size] = embedded.dims();
        let embedded = embedded.reshape([batch_size, 1, seq_length, embedding_size]);

        let pooled = self
            .convolutions
            .iter()
            .map(|conv| {
                // [batch_size, num_filters, seq_length - filter_size + 1, 1]
                let features = relu(conv.forward(embedded.clone()));
                let [_, num_filters, _, _] = features.dims();

                features.max_dim(2).reshape([batch_size, num_filters])
            })
            .collect::<Vec<_>>();

        let features = self.dropout.forward(Tensor::cat(pooled, 1));

        self.output.forward(features)
    }

    /// Defines forward pass for training
    pub fn forward(&self, item: Train<B>) -> ClassificationOutput<B> {
        let device = &self.devices()[0];
        let targets = item.targets.to_device(device);

        let output = self.logits(item.tokens.to_device(device));

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }

    /// Half the squared L2 norm of the output layer's weights and bias
    pub fn output_l2(&self) -> Tensor<B, 1> {
        let weight = self.output.weight.val();
        let mut l2 = (weight.clone() * weight).sum();

        if let Some(bias) = &self.output.bias {
            let bias = bias.val();
            l2 = l2 + (bias.clone() * bias).sum();
        }

        l2.div_scalar(2.0)
    }

    /// Add the L2 penalty on the output layer to a loss
    pub fn regularized_loss(&self, loss: Tensor<B, 1>, l2_reg_lambda: f64) -> Tensor<B, 1> {
        if l2_reg_lambda > 0.0 {
            loss + self.output_l2().mul_scalar(l2_reg_lambda)
        } else {
            loss
        }
    }

    /// Defines forward pass for inference, returning class probabilities
    pub fn infer(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        softmax(self.logits(tokens), 1)
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::NdArray,
        tensor::{Data, Shape},
    };

    use crate::models::text_cnn::Config;

    use super::*;

    fn config() -> Config {
        Config::new(6, 3, 10, 4, vec![2, 3], 5)
    }

    #[test]
    fn test_logits_shape() {
        let device = Default::default();
        let model = config().init::<NdArray>(&device);

        let tokens = Tensor::<NdArray, 2, Int>::zeros([2, 6], &device);

        assert_eq!(model.logits(tokens).dims(), [2, 3]);
    }

    #[test]
    fn test_infer_returns_probabilities() {
        let device = Default::default();
        let model = config().init::<NdArray>(&device);

        let tokens = Tensor::<NdArray, 2, Int>::ones([4, 6], &device);
        let sums = model.infer(tokens).sum_dim(1).into_data().value;

        for sum in sums {
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_with_embedding_replaces_weights() {
        let device = Default::default();
        let weights = Tensor::<NdArray, 2>::from_data(
            Data::new(vec![0.5f32; 40], Shape::new([10, 4])),
            &device,
        );

        let model = config().init::<NdArray>(&device).with_embedding(weights);

        let values = model.embedding.weight.val().into_data().value;
        assert!(values.iter().all(|v| (*v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_output_l2_is_non_negative() {
        let device = Default::default();
        let model = config().init::<NdArray>(&device);

        let l2 = model.output_l2().into_scalar();

        assert!(l2 >= 0.0);
    }

    #[test]
    fn test_regularized_loss_adds_the_penalty() {
        let device = Default::default();
        let model = config().init::<NdArray>(&device);
        let loss = Tensor::<NdArray, 1>::from_floats([1.0f32], &device);

        let plain = model.regularized_loss(loss.clone(), 0.0).into_scalar();
        let penalized = model.regularized_loss(loss, 2.0).into_scalar();
        let expected = 1.0 + 2.0 * model.output_l2().into_scalar();

        assert_eq!(plain, 1.0);
        assert!((penalized - expected).abs() < 1e-4);
    }
}
