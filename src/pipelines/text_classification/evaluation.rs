use burn::{
    data::dataloader::batcher::Batcher as _,
    tensor::{backend::Backend, ElementConversion},
    train::ClassificationOutput,
};

use crate::models::text_cnn::Model;

use super::{
    batcher::{Batcher, Encoded},
    metrics::Confusion,
};

/// Loss and scores of a model on a set of examples
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    /// Mean loss per example, including the L2 penalty
    pub loss: f64,

    /// Fraction of correct predictions
    pub accuracy: f64,

    /// F1 of the positive class (binary) or macro F1 (multi-class)
    pub f1: f64,

    /// Number of examples evaluated
    pub samples: usize,
}

/// Predicted and actual class ids of a classification output
pub fn predictions<B: Backend>(output: &ClassificationOutput<B>) -> (Vec<usize>, Vec<usize>) {
    let predicted = output
        .output
        .clone()
        .argmax(1)
        .into_data()
        .convert::<i64>()
        .value
        .into_iter()
        .map(|id| id as usize)
        .collect();

    let actual = output
        .targets
        .clone()
        .into_data()
        .convert::<i64>()
        .value
        .into_iter()
        .map(|id| id as usize)
        .collect();

    (predicted, actual)
}

/// Evaluate a model on encoded examples, in batches of `batch_size`.
///
/// Run this with a model on the inner (non-autodiff) backend so dropout is disabled.
pub fn evaluate<B: Backend>(
    model: &Model<B>,
    batcher: &Batcher<B>,
    items: &[Encoded],
    num_classes: usize,
    batch_size: usize,
    l2_reg_lambda: f64,
) -> Evaluation {
    let mut confusion = Confusion::new(num_classes);
    let mut loss_sum = 0.0;

    for chunk in items.chunks(batch_size.max(1)) {
        let output = model.forward(batcher.batch(chunk.to_vec()));

        loss_sum += output.loss.clone().into_scalar().elem::<f64>() * chunk.len() as f64;

        let (predicted, actual) = predictions(&output);
        confusion.extend(&predicted, &actual);
    }

    let samples = confusion.total();

    let loss = if samples == 0 {
        f64::NAN
    } else {
        let penalty = if l2_reg_lambda > 0.0 {
            model.output_l2().into_scalar().elem::<f64>() * l2_reg_lambda
        } else {
            0.0
        };

        loss_sum / samples as f64 + penalty
    };

    Evaluation {
        loss,
        accuracy: confusion.accuracy(),
        f1: confusion.f1(),
        samples,
    }
}
