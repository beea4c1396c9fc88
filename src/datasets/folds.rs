use std::path::{Path, PathBuf};

use burn::data::dataset::{Dataset as _, InMemDataset};
use derive_new::new;
use serde::{Deserialize, Serialize};

use super::DatasetError;

/// The placeholder substituted with the fold index in training file patterns
pub static FOLD_PLACEHOLDER: &str = "{fold}";

/// A labeled row of text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Item {
    /// The text for classification
    pub text: String,

    /// The class name of the text
    pub label: String,

    /// The product category the text comes from, if recorded
    #[serde(default)]
    pub category: String,
}

/// The rows of a single cross-validation fold
#[derive(Clone, Debug)]
pub struct Split {
    /// Training rows for this fold
    pub train: Vec<Item>,

    /// In-category test rows, shared across folds
    pub test: Vec<Item>,

    /// Out-of-category validation rows, shared across folds
    pub valid: Vec<Item>,
}

/// Locations of the fold files on disk
#[derive(Clone, Debug, new)]
pub struct Folds {
    /// Directory holding the per-fold training files
    pub base_path: PathBuf,

    /// File name of the training data, with `{fold}` standing in for the fold index
    pub train_file_pattern: String,

    /// The in-category test file
    pub test_file: PathBuf,

    /// The out-of-category validation file
    pub valid_file: PathBuf,
}

impl Folds {
    /// The training file for the given fold
    pub fn train_path(&self, fold: usize) -> PathBuf {
        self.base_path.join(
            self.train_file_pattern
                .replace(FOLD_PLACEHOLDER, &fold.to_string()),
        )
    }

    /// Load the training, test and validation rows for a fold
    pub async fn load(&self, fold: usize) -> Result<Split, DatasetError> {
        let train = read_items(&self.train_path(fold))?;
        let test = read_items(&self.test_file)?;
        let valid = read_items(&self.valid_file)?;

        Ok(Split { train, test, valid })
    }
}

/// Read all rows from a CSV file with a `text,label,category` header
pub fn read_items(path: &Path) -> Result<Vec<Item>, DatasetError> {
    let reader = csv::ReaderBuilder::new();

    let dataset: InMemDataset<Item> =
        InMemDataset::from_csv(path, &reader).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if dataset.is_empty() {
        return Err(DatasetError::Empty(path.to_path_buf()));
    }

    Ok(dataset.iter().collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("burn-text-cnn-folds-{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_train_path_substitutes_fold() {
        let folds = Folds::new(
            PathBuf::from("data/processed"),
            "in-cat-train-{fold}.csv".to_string(),
            PathBuf::from("test.csv"),
            PathBuf::from("valid.csv"),
        );

        assert_eq!(
            folds.train_path(3),
            PathBuf::from("data/processed/in-cat-train-3.csv")
        );
    }

    #[test]
    fn test_read_items_defaults_missing_category() {
        let dir = scratch_dir("categories");
        let path = dir.join("train.csv");
        std::fs::write(&path, "text,label\ngreat battery,1\n\"broke, fast\",0\n").unwrap();

        let items = read_items(&path).unwrap();

        assert_eq!(
            items,
            vec![
                Item::new("great battery".into(), "1".into(), String::new()),
                Item::new("broke, fast".into(), "0".into(), String::new()),
            ]
        );
    }

    #[test]
    fn test_read_items_rejects_empty_files() {
        let dir = scratch_dir("empty");
        let path = dir.join("empty.csv");
        std::fs::write(&path, "text,label,category\n").unwrap();

        assert!(matches!(read_items(&path), Err(DatasetError::Empty(_))));
    }

    #[test]
    fn test_read_items_reports_missing_files() {
        let path = scratch_dir("missing").join("nope.csv");

        assert!(matches!(read_items(&path), Err(DatasetError::Read { .. })));
    }
}
