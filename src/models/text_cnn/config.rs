use burn::{
    nn::{conv::Conv2dConfig, DropoutConfig, EmbeddingConfig, LinearConfig},
    tensor::backend::Backend,
};

use super::model::Model;

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    /// Length every token sequence is padded to
    pub sequence_length: usize,

    /// Number of output classes
    pub num_classes: usize,

    /// Number of vocabulary ids, including the unknown token
    pub vocab_size: usize,

    /// Dimensionality of the word embeddings
    pub embedding_size: usize,

    /// Heights of the convolution windows, in tokens
    pub filter_sizes: Vec<usize>,

    /// Number of filters per filter size
    pub num_filters: usize,

    /// Dropout probability applied to the pooled features
    #[config(default = 0.3)]
    pub dropout: f64,
}

impl Config {
    /// Width of the pooled feature vector fed to the output layer
    pub fn num_features(&self) -> usize {
        self.num_filters * self.filter_sizes.len()
    }

    /// Initializes a model with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_size).init(device);

        let convolutions = self
            .filter_sizes
            .iter()
            .map(|&filter_size| {
                Conv2dConfig::new([1, self.num_filters], [filter_size, self.embedding_size])
                    .init(device)
            })
            .collect();

        let output = LinearConfig::new(self.num_features(), self.num_classes).init(device);

        Model {
            embedding,
            convolutions,
            dropout: DropoutConfig::new(self.dropout).init(),
            output,
            n_classes: self.num_classes,
        }
    }
}
