use std::collections::HashMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    datasets::{DatasetError, Item, Split},
    utils::classes::{invert_map, sorted_labels},
};

use super::{batcher::Encoded, vocabulary::Vocabulary};

/// A fold ready for training: the fitted vocabulary and encoded splits
#[derive(Clone, Debug)]
pub struct Prepared {
    /// Vocabulary fitted on the training texts
    pub vocabulary: Vocabulary,

    /// Class labels, indexed by class id
    pub labels: Vec<String>,

    /// Shuffled training examples
    pub train: Vec<Encoded>,

    /// In-category test examples
    pub test: Vec<Encoded>,

    /// Out-of-category validation examples
    pub valid: Vec<Encoded>,

    /// Validation examples grouped by category, in order of first appearance
    pub categories: Vec<(String, Vec<Encoded>)>,
}

impl Prepared {
    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }
}

/// Fit the vocabulary on the training texts, encode every split, and shuffle the training set
pub fn preprocess(split: Split, seed: u64) -> Result<Prepared, DatasetError> {
    let Split { train, test, valid } = split;

    let vocabulary = Vocabulary::fit(train.iter().map(|item| item.text.as_str()));
    let labels = sorted_labels(train.iter().map(|item| item.label.as_str()));
    let label2id: HashMap<String, usize> = invert_map(labels.iter().cloned().enumerate());

    let encode = |items: &[Item]| -> Result<Vec<Encoded>, DatasetError> {
        items
            .iter()
            .map(|item| {
                let label = item.label.trim();
                let class_id = label2id
                    .get(label)
                    .copied()
                    .ok_or_else(|| DatasetError::UnknownLabel(label.to_string()))?;

                Ok(Encoded::new(vocabulary.encode(&item.text), class_id))
            })
            .collect()
    };

    let mut train_encoded = encode(&train)?;
    let test_encoded = encode(&test)?;
    let valid_encoded = encode(&valid)?;

    let mut categories: Vec<(String, Vec<Encoded>)> = Vec::new();
    for (item, encoded) in valid.iter().zip(&valid_encoded) {
        let category = item.category.trim();

        if category.is_empty() {
            continue;
        }

        match categories.iter_mut().find(|(name, _)| name == category) {
            Some((_, items)) => items.push(encoded.clone()),
            None => categories.push((category.to_string(), vec![encoded.clone()])),
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    train_encoded.shuffle(&mut rng);

    log::info!("Vocabulary Size: {}", vocabulary.len());
    log::info!(
        "Train/Test/Val split: {}/{}/{}",
        train_encoded.len(),
        test_encoded.len(),
        valid_encoded.len()
    );

    Ok(Prepared {
        vocabulary,
        labels,
        train: train_encoded,
        test: test_encoded,
        valid: valid_encoded,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(text: &str, label: &str, category: &str) -> Item {
        Item::new(text.into(), label.into(), category.into())
    }

    fn split() -> Split {
        Split {
            train: vec![
                item("great sound", "1", ""),
                item("awful sound quality", "0", ""),
                item("great value", "1", ""),
            ],
            test: vec![item("great headphones", "1", "")],
            valid: vec![
                item("awful book", "0", "Books"),
                item("great toy", "1", "Toys"),
                item("great novel", "1", "Books"),
                item("no category", "0", ""),
            ],
        }
    }

    #[test]
    fn test_vocabulary_is_fitted_on_training_texts_only() {
        let prepared = preprocess(split(), 10).unwrap();

        assert_eq!(prepared.vocabulary.len(), 6);
        assert_eq!(prepared.vocabulary.max_document_length(), 3);
        assert_eq!(prepared.test[0].token_ids, vec![1, 0]);
    }

    #[test]
    fn test_labels_are_sorted_class_ids() {
        let prepared = preprocess(split(), 10).unwrap();

        assert_eq!(prepared.labels, vec!["0", "1"]);
        assert_eq!(prepared.num_classes(), 2);

        let mut class_ids: Vec<usize> = prepared.train.iter().map(|e| e.class_id).collect();
        class_ids.sort();
        assert_eq!(class_ids, vec![0, 1, 1]);
    }

    #[test]
    fn test_categories_keep_first_appearance_order() {
        let prepared = preprocess(split(), 10).unwrap();

        let names: Vec<&str> = prepared
            .categories
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();

        assert_eq!(names, vec!["Books", "Toys"]);
        assert_eq!(prepared.categories[0].1.len(), 2);
        assert_eq!(prepared.categories[1].1.len(), 1);
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let first = preprocess(split(), 10).unwrap();
        let second = preprocess(split(), 10).unwrap();

        assert_eq!(first.train, second.train);
        assert_eq!(first.train.len(), 3);
    }

    #[test]
    fn test_unknown_labels_are_rejected() {
        let mut split = split();
        split.valid.push(item("meh", "2", "Books"));

        assert!(matches!(
            preprocess(split, 10),
            Err(DatasetError::UnknownLabel(label)) if label == "2"
        ));
    }
}
