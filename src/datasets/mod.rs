use std::path::PathBuf;

/// Cross-validation folds stored as CSV files
pub mod folds;

pub use folds::{Folds, Item, Split};

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The file could not be read or parsed
    #[error("unable to read {path}: {source}")]
    Read {
        /// The offending file
        path: PathBuf,

        /// The underlying error
        source: std::io::Error,
    },

    /// The file holds no rows
    #[error("no rows found in {0}")]
    Empty(PathBuf),

    /// A label appears in evaluation data but never in training data
    #[error("label {0:?} does not appear in the training data")]
    UnknownLabel(String),
}
