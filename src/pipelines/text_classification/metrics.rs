/// Per-class prediction counts for a set of examples
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confusion {
    /// Number of classes
    num_classes: usize,

    /// Correct predictions per class
    true_positives: Vec<usize>,

    /// Predictions of a class that were wrong
    false_positives: Vec<usize>,

    /// Examples of a class that were predicted as something else
    false_negatives: Vec<usize>,

    /// Total examples seen
    total: usize,
}

impl Confusion {
    /// An empty confusion table
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            true_positives: vec![0; num_classes],
            false_positives: vec![0; num_classes],
            false_negatives: vec![0; num_classes],
            total: 0,
        }
    }

    /// Count paired predicted and actual class ids
    pub fn from_pairs(predicted: &[usize], actual: &[usize], num_classes: usize) -> Self {
        let mut confusion = Self::new(num_classes);
        confusion.extend(predicted, actual);
        confusion
    }

    /// Add paired predicted and actual class ids
    pub fn extend(&mut self, predicted: &[usize], actual: &[usize]) {
        for (&p, &a) in predicted.iter().zip(actual) {
            self.total += 1;

            if p == a {
                self.true_positives[a] += 1;
            } else {
                if p < self.num_classes {
                    self.false_positives[p] += 1;
                }
                self.false_negatives[a] += 1;
            }
        }
    }

    /// Number of examples counted
    pub fn total(&self) -> usize {
        self.total
    }

    /// Fraction of correct predictions
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        self.true_positives.iter().sum::<usize>() as f64 / self.total as f64
    }

    /// F1 of a single class; 0 when the class was never predicted nor present
    pub fn class_f1(&self, class_id: usize) -> f64 {
        let tp = self.true_positives[class_id];
        let denominator = 2 * tp + self.false_positives[class_id] + self.false_negatives[class_id];

        if denominator == 0 {
            0.0
        } else {
            (2 * tp) as f64 / denominator as f64
        }
    }

    /// F1 of the positive class (id 1) for binary tasks, the macro average otherwise
    pub fn f1(&self) -> f64 {
        match self.num_classes {
            0 => 0.0,
            1 => self.class_f1(0),
            2 => self.class_f1(1),
            n => (0..n).map(|class_id| self.class_f1(class_id)).sum::<f64>() / n as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_binary_f1_scores_the_positive_class() {
        // tp = 2, fp = 1, fn = 1
        let confusion = Confusion::from_pairs(&[1, 1, 1, 0, 0], &[1, 1, 0, 1, 0], 2);

        assert!(close(confusion.accuracy(), 0.6));
        assert!(close(confusion.f1(), 4.0 / 6.0));
    }

    #[test]
    fn test_binary_f1_without_positives_is_zero() {
        let confusion = Confusion::from_pairs(&[0, 0], &[0, 0], 2);

        assert!(close(confusion.accuracy(), 1.0));
        assert!(close(confusion.f1(), 0.0));
    }

    #[test]
    fn test_multiclass_f1_is_macro_averaged() {
        let confusion = Confusion::from_pairs(&[0, 1, 2, 2], &[0, 1, 2, 1], 3);

        let expected = (1.0 + 2.0 / 3.0 + 2.0 / 3.0) / 3.0;
        assert!(close(confusion.f1(), expected));
    }

    #[test]
    fn test_empty_confusion() {
        let confusion = Confusion::new(2);

        assert_eq!(confusion.total(), 0);
        assert!(close(confusion.accuracy(), 0.0));
        assert!(close(confusion.f1(), 0.0));
    }
}
