use std::{collections::BTreeSet, hash::Hash};

/// Invert a map by swapping keys and values
pub fn invert_map<K, V, MK, MV>(original: MK) -> MV
where
    K: Ord + Hash + Eq,
    V: Ord + Hash + Eq + Clone,
    MK: IntoIterator<Item = (K, V)>,
    MV: FromIterator<(V, K)>,
{
    original
        .into_iter()
        .map(|(key, value)| (value, key))
        .collect()
}

/// Collect the distinct class labels in sorted order, so class ids are stable across runs
pub fn sorted_labels<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sorted_labels_are_distinct_and_ordered() {
        let labels = sorted_labels(["1", "0", "1", " 0 "]);

        assert_eq!(labels, vec!["0".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_invert_map_builds_label_index() {
        let labels = vec!["neg".to_string(), "pos".to_string()];
        let label2id: HashMap<String, usize> = invert_map(labels.into_iter().enumerate());

        assert_eq!(label2id["neg"], 0);
        assert_eq!(label2id["pos"], 1);
    }
}
