use std::{fs, path::Path};

use burn::{
    config::Config as _,
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};

use crate::models::text_cnn;

use super::{vocabulary::Vocabulary, Batcher, LABELS_FILE, MODEL_CONFIG_FILE, MODEL_FILE, VOCABULARY_FILE};

/// The predicted class of a text
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// The class name
    pub label: String,

    /// The softmax probability of the class
    pub confidence: f64,
}

/// Classify text samples with a model trained on one fold
pub fn infer<B: Backend>(
    device: B::Device,  // Device on which to perform computation (e.g., CPU or CUDA device)
    artifact_dir: &str, // Directory holding the fold's model, config, vocabulary and labels
    samples: &[String], // Text samples for inference
) -> anyhow::Result<Vec<Prediction>> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let artifact_dir = Path::new(artifact_dir);

    // Load experiment configuration
    let config = text_cnn::Config::load(artifact_dir.join(MODEL_CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to load config file: {}", e))?;

    let vocabulary = Vocabulary::load(artifact_dir.join(VOCABULARY_FILE))?;

    let labels: Vec<String> =
        serde_json::from_str(&fs::read_to_string(artifact_dir.join(LABELS_FILE))?)?;

    if labels.len() != config.num_classes {
        return Err(anyhow!(
            "Found {} labels for a model with {} classes",
            labels.len(),
            config.num_classes
        ));
    }

    log::info!("Loading weights...");

    let recorder = CompactRecorder::new();
    let record = Recorder::<B>::load(&recorder, artifact_dir.join(MODEL_FILE), &device)
        .map_err(|e| anyhow!("Unable to load trained model weights: {}", e))?;

    let model = config.init::<B>(&device).load_record(record);

    log::info!("Running inference...");

    let batcher = Batcher::<B>::new(config.sequence_length, device);
    let tokens = batcher.tokens(samples.iter().map(|s| vocabulary.encode(s)).collect());

    let probabilities = model
        .infer(tokens)
        .into_data()
        .convert::<f64>()
        .value;

    let predictions = probabilities
        .chunks(config.num_classes)
        .map(|row| {
            let (class_id, confidence) = row
                .iter()
                .copied()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap_or((0, 0.0));

            Prediction {
                label: labels[class_id].clone(),
                confidence,
            }
        })
        .collect();

    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;

    #[test]
    fn test_no_samples_needs_no_artifacts() {
        let predictions = infer::<NdArray>(Default::default(), "does-not-exist", &[]).unwrap();

        assert!(predictions.is_empty());
    }

    #[test]
    fn test_missing_artifacts_are_reported() {
        let result = infer::<NdArray>(
            Default::default(),
            "does-not-exist",
            &["some text".to_string()],
        );

        assert!(result.is_err());
    }
}
