use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::backend::{Autodiff, NdArray};
use burn_text_cnn::pipelines::text_classification::{
    checkpoint::read_index, infer, run, Config,
};
use pretty_assertions::assert_eq;

const TRAIN: &str = "\
text,label,category
great sound and great bass,pos,
awful sound,neg,
great value for the price,pos,
broke after a week awful,neg,
";

const TEST: &str = "\
text,label,category
great bass,pos,
awful price,neg,
";

const VALID: &str = "\
text,label,category
a great novel,pos,Books
an awful plot,neg,Books
great toy for kids,pos,Toys
";

const EMBEDDINGS: &str = "\
4 4
great 0.5 0.1 -0.2 0.3
awful -0.5 -0.1 0.2 -0.3
sound 0.1 0.1 0.1 0.1
price 0.0 0.2 0.0 -0.2
";

fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("burn-text-cnn-it-{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("data")).unwrap();

    for fold in 0..2 {
        fs::write(dir.join(format!("data/train-{fold}.csv")), TRAIN).unwrap();
    }
    fs::write(dir.join("data/test.csv"), TEST).unwrap();
    fs::write(dir.join("data/valid.csv"), VALID).unwrap();
    fs::write(dir.join("w2v.txt"), EMBEDDINGS).unwrap();

    dir
}

fn config(dir: &Path) -> Config {
    let path = |name: &str| dir.join(name).to_string_lossy().into_owned();

    Config::new()
        .with_data_base_path(path("data"))
        .with_train_file_pattern("train-{fold}.csv".to_string())
        .with_data_file_test(path("data/test.csv"))
        .with_data_file_valid(path("data/valid.csv"))
        .with_embedding_path(path("w2v.txt"))
        .with_embedding_bin(false)
        .with_embedding_dim(4)
        .with_filter_sizes(vec![2, 3])
        .with_num_filters(2)
        .with_batch_size(2)
        .with_num_epochs(2)
        .with_evaluate_every(1)
        .with_checkpoint_every(1)
        .with_num_checkpoints(2)
        .with_num_folds(2)
        .with_runs_dir(path("runs"))
        .with_report_path(path("reports/results.csv"))
}

fn run_dir(dir: &Path) -> PathBuf {
    let mut runs: Vec<PathBuf> = fs::read_dir(dir.join("runs"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();

    assert_eq!(runs.len(), 1);
    runs.remove(0)
}

#[tokio::test]
async fn test_cross_validation_writes_a_report_per_fold() {
    let dir = workspace("report");
    let report = run::<Autodiff<NdArray>>(&config(&dir), Default::default())
        .await
        .unwrap();

    let names: Vec<&str> = report.folds().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["fold-0", "fold-1"]);

    assert_eq!(
        report.columns(),
        vec![
            "name",
            "acc_in_cat",
            "f1_in_cat",
            "acc_out_of_cat",
            "f1_out_of_cat",
            "Books-f1",
            "Books-acc",
            "Toys-f1",
            "Toys-acc",
        ]
    );

    for fold in report.folds() {
        assert!((0.0..=1.0).contains(&fold.acc_in_cat));
        assert!((0.0..=1.0).contains(&fold.acc_out_of_cat));
    }

    let csv = fs::read_to_string(dir.join("reports/results.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.starts_with("name,acc_in_cat,f1_in_cat,acc_out_of_cat,f1_out_of_cat,Books-f1"));
}

#[tokio::test]
async fn test_each_fold_keeps_its_artifacts() {
    let dir = workspace("artifacts");
    run::<Autodiff<NdArray>>(&config(&dir), Default::default())
        .await
        .unwrap();

    let run_dir = run_dir(&dir);
    assert!(run_dir.join("training.json").exists());

    for fold in 0..2 {
        let fold_dir = run_dir.join(format!("fold-{fold}"));

        for file in ["config.json", "vocab.json", "labels.json", "model.mpk"] {
            assert!(fold_dir.join(file).exists(), "missing {file} in fold {fold}");
        }

        // 4 rows in batches of 2 over 2 epochs
        let index = read_index(fold_dir.join("checkpoints")).unwrap();
        assert_eq!(index.latest, Some(4));
        assert_eq!(index.all, vec![3, 4]);

        let scalars = fs::read_to_string(fold_dir.join("summaries/dev/scalars.csv")).unwrap();
        assert!(scalars.lines().any(|line| line.contains(",f1,")));

        let train = fs::read_to_string(fold_dir.join("summaries/train/scalars.csv")).unwrap();
        for tag in [
            "embedding/weight/grad/sparsity",
            "output/weight/grad/hist/mean",
            "convolutions.1/bias/grad/sparsity",
        ] {
            assert!(train.contains(&format!(",{tag},")), "missing {tag}");
        }
    }
}

#[tokio::test]
async fn test_trained_fold_classifies_new_text() {
    let dir = workspace("infer");
    run::<Autodiff<NdArray>>(&config(&dir), Default::default())
        .await
        .unwrap();

    let fold_dir = run_dir(&dir).join("fold-0");
    let samples = vec!["great sound".to_string(), "awful".to_string()];

    let predictions = infer::<NdArray>(
        Default::default(),
        fold_dir.to_str().unwrap(),
        &samples,
    )
    .unwrap();

    assert_eq!(predictions.len(), 2);
    for prediction in predictions {
        assert!(["neg", "pos"].contains(&prediction.label.as_str()));
        assert!(prediction.confidence >= 0.5 && prediction.confidence <= 1.0);
    }
}
