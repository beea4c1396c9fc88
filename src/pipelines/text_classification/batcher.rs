use burn::{
    data::dataloader,
    tensor::{backend::Backend, Data, ElementConversion, Int, Tensor},
};
use derive_new::new;

use crate::utils::tensors::pad_to;

use super::vocabulary::UNK_ID;

/// A text reduced to token ids and a class id
#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct Encoded {
    /// Token ids, at most as long as the longest training document
    pub token_ids: Vec<usize>,

    /// The class id of the label
    pub class_id: usize,
}

/// A training batch for text classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Padded token ids, `[batch_size, sequence_length]`
    pub tokens: Tensor<B, 2, Int>,

    /// Class ids for the batch
    pub targets: Tensor<B, 1, Int>,
}

/// Struct for batching encoded texts
#[derive(Clone, new)]
pub struct Batcher<B: Backend> {
    /// Length every token sequence is padded to
    sequence_length: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Pad token id sequences into a `[batch_size, sequence_length]` tensor
    pub fn tokens(&self, token_ids: Vec<Vec<usize>>) -> Tensor<B, 2, Int> {
        pad_to(UNK_ID, token_ids, self.sequence_length, &self.device)
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend> dataloader::batcher::Batcher<Encoded, Train<B>> for Batcher<B> {
    /// Collects a vector of encoded items into a training batch
    fn batch(&self, items: Vec<Encoded>) -> Train<B> {
        let batch_size = items.len();

        let mut token_ids = Vec::with_capacity(batch_size);
        let mut class_ids: Vec<B::IntElem> = Vec::with_capacity(batch_size);

        for item in items {
            token_ids.push(item.token_ids);
            class_ids.push((item.class_id as i64).elem());
        }

        let targets: Tensor<B, 1, Int> =
            Tensor::from_data(Data::new(class_ids, [batch_size].into()), &self.device);

        Train {
            tokens: self.tokens(token_ids),
            targets,
        }
    }
}
