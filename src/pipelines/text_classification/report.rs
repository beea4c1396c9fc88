use std::path::Path;

use derive_new::new;

use crate::utils::files::ensure_parent_dir;

use super::evaluation::Evaluation;

/// The fixed leading columns of the report
pub static BASE_COLUMNS: [&str; 5] = [
    "name",
    "acc_in_cat",
    "f1_in_cat",
    "acc_out_of_cat",
    "f1_out_of_cat",
];

/// Accuracy and F1 on one validation category
#[derive(Clone, Debug, PartialEq, new)]
pub struct CategoryScore {
    /// The category name
    pub category: String,

    /// F1 on the category
    pub f1: f64,

    /// Accuracy on the category
    pub accuracy: f64,
}

/// The final scores of one fold
#[derive(Clone, Debug, PartialEq, new)]
pub struct FoldResult {
    /// Row name, e.g. `fold-3`
    pub name: String,

    /// Accuracy on the in-category test set
    pub acc_in_cat: f64,

    /// F1 on the in-category test set
    pub f1_in_cat: f64,

    /// Accuracy on the out-of-category validation set
    pub acc_out_of_cat: f64,

    /// F1 on the out-of-category validation set
    pub f1_out_of_cat: f64,

    /// Scores per validation category
    pub categories: Vec<CategoryScore>,
}

impl FoldResult {
    /// Assemble a fold row from its evaluations
    pub fn from_evaluations(
        fold: usize,
        in_category: &Evaluation,
        out_of_category: &Evaluation,
        categories: Vec<CategoryScore>,
    ) -> Self {
        Self::new(
            format!("fold-{fold}"),
            in_category.accuracy,
            in_category.f1,
            out_of_category.accuracy,
            out_of_category.f1,
            categories,
        )
    }
}

/// Mean scores across folds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Means {
    /// Mean in-category accuracy
    pub acc_in_cat: f64,

    /// Mean in-category F1
    pub f1_in_cat: f64,

    /// Mean out-of-category accuracy
    pub acc_out_of_cat: f64,

    /// Mean out-of-category F1
    pub f1_out_of_cat: f64,
}

/// Results of every fold, in order
#[derive(Clone, Debug, Default)]
pub struct Report {
    folds: Vec<FoldResult>,
}

impl Report {
    /// Add a fold result
    pub fn push(&mut self, result: FoldResult) {
        self.folds.push(result);
    }

    /// The fold results
    pub fn folds(&self) -> &[FoldResult] {
        &self.folds
    }

    /// Category names in order of first appearance across folds
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();

        for score in self.folds.iter().flat_map(|fold| &fold.categories) {
            if !categories.contains(&score.category) {
                categories.push(score.category.clone());
            }
        }

        categories
    }

    /// Header row: the base columns, then `<category>-f1` and `<category>-acc` per category
    pub fn columns(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(
                self.categories()
                    .into_iter()
                    .flat_map(|c| [format!("{c}-f1"), format!("{c}-acc")]),
            )
            .collect()
    }

    /// Mean in-category and out-of-category scores, if any fold finished
    pub fn means(&self) -> Option<Means> {
        if self.folds.is_empty() {
            return None;
        }

        let n = self.folds.len() as f64;
        let mean = |f: fn(&FoldResult) -> f64| self.folds.iter().map(f).sum::<f64>() / n;

        Some(Means {
            acc_in_cat: mean(|r| r.acc_in_cat),
            f1_in_cat: mean(|r| r.f1_in_cat),
            acc_out_of_cat: mean(|r| r.acc_out_of_cat),
            f1_out_of_cat: mean(|r| r.f1_out_of_cat),
        })
    }

    /// Write the report as CSV, creating the parent directory if needed
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        ensure_parent_dir(path.as_ref())?;

        let mut writer = csv::Writer::from_path(path.as_ref())
            .map_err(|e| anyhow!("Unable to create report {:?}: {}", path.as_ref(), e))?;

        let categories = self.categories();

        writer.write_record(self.columns())?;

        for fold in &self.folds {
            let mut record = vec![
                fold.name.clone(),
                fold.acc_in_cat.to_string(),
                fold.f1_in_cat.to_string(),
                fold.acc_out_of_cat.to_string(),
                fold.f1_out_of_cat.to_string(),
            ];

            for category in &categories {
                match fold.categories.iter().find(|s| &s.category == category) {
                    Some(score) => {
                        record.push(score.f1.to_string());
                        record.push(score.accuracy.to_string());
                    }
                    None => record.extend([String::new(), String::new()]),
                }
            }

            writer.write_record(&record)?;
        }

        writer.flush()?;

        Ok(())
    }
}
