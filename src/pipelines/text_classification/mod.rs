/// Vocabulary fitting and text encoding
pub mod vocabulary;

/// Batcher
pub mod batcher;

/// Fold preprocessing
pub mod preprocess;

/// Accuracy and F1
pub mod metrics;

/// Model evaluation
pub mod evaluation;

/// Gradient summaries
pub mod gradients;

/// Step schedules for evaluation and checkpoints
pub mod schedule;

/// Checkpoints
pub mod checkpoint;

/// Scalar summaries
pub mod summary;

/// Cross-validation report
pub mod report;

/// Training
pub mod training;

/// Inference
pub mod inference;

pub use batcher::{Batcher, Encoded};
pub use inference::infer;
pub use preprocess::{preprocess, Prepared};
pub use report::Report;
pub use training::{run, train_fold, Config};
pub use vocabulary::Vocabulary;

/// The unique string token that identifies this pipeline
pub static PIPELINE: &str = "text-classification";

/// Model configuration written next to each fold's model
pub static MODEL_CONFIG_FILE: &str = "config.json";

/// Training configuration written at the root of each run
pub static TRAINING_CONFIG_FILE: &str = "training.json";

/// Vocabulary written next to each fold's model
pub static VOCABULARY_FILE: &str = "vocab.json";

/// Class labels written next to each fold's model
pub static LABELS_FILE: &str = "labels.json";

/// The final model record of each fold
pub static MODEL_FILE: &str = "model";
