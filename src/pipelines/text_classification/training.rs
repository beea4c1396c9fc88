use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use burn::{
    config::Config as _,
    data::{dataloader::DataLoaderBuilder, dataset::InMemDataset},
    module::{AutodiffModule, Module},
    optim::{AdamConfig, GradientsParams, Optimizer},
    record::{CompactRecorder, Recorder},
    tensor::{backend::AutodiffBackend, ElementConversion},
    LearningRate,
};
use log::info;

use crate::{
    datasets::Folds,
    models::{text_cnn, word2vec},
};

use super::{
    batcher::{Batcher, Encoded},
    checkpoint::Checkpointer,
    evaluation::{evaluate, predictions, Evaluation},
    gradients::{gradient_stats, GradientStats},
    metrics::Confusion,
    preprocess::{preprocess, Prepared},
    report::{CategoryScore, FoldResult, Report},
    schedule::Schedule,
    summary::SummaryWriter,
    LABELS_FILE, MODEL_CONFIG_FILE, MODEL_FILE, TRAINING_CONFIG_FILE, VOCABULARY_FILE,
};

/// Define configuration struct for the experiment
#[derive(burn::config::Config)]
pub struct Config {
    /// Directory holding the per-fold training files
    #[config(default = "\"data/processed\".to_string()")]
    pub data_base_path: String,

    /// Training file name inside `data_base_path`, with `{fold}` replaced by the fold index
    #[config(default = "\"in-cat-train-{fold}.csv\".to_string()")]
    pub train_file_pattern: String,

    /// In-category test data
    #[config(default = "\"data/processed/in-cat-test.csv\".to_string()")]
    pub data_file_test: String,

    /// Out-of-category validation data
    #[config(default = "\"data/processed/out-of-cat-valid.csv\".to_string()")]
    pub data_file_valid: String,

    /// Pretrained word2vec embeddings
    #[config(default = "\"models/w2v-amz.bin\".to_string()")]
    pub embedding_path: String,

    /// Whether the embedding file is in the binary word2vec format
    #[config(default = true)]
    pub embedding_bin: bool,

    /// Dimensionality of the word embeddings
    #[config(default = 20)]
    pub embedding_dim: usize,

    /// Convolution window heights
    #[config(default = "vec![3, 4, 5]")]
    pub filter_sizes: Vec<usize>,

    /// Number of filters per filter size
    #[config(default = 3)]
    pub num_filters: usize,

    /// Probability of keeping a pooled feature during training
    #[config(default = 0.7)]
    pub dropout_keep_prob: f64,

    /// Weight of the L2 penalty on the output layer
    #[config(default = 0.0)]
    pub l2_reg_lambda: f64,

    /// Batch size
    #[config(default = 32)]
    pub batch_size: usize,

    /// Batch size used when evaluating
    #[config(default = 256)]
    pub eval_batch_size: usize,

    /// Number of epochs
    #[config(default = 20)]
    pub num_epochs: usize,

    /// Evaluate on the test set after this many steps (0 disables)
    #[config(default = 50)]
    pub evaluate_every: usize,

    /// Save a checkpoint after this many steps (0 disables)
    #[config(default = 100)]
    pub checkpoint_every: usize,

    /// Number of checkpoints to keep (0 keeps all)
    #[config(default = 5)]
    pub num_checkpoints: usize,

    /// Adam learning rate
    #[config(default = 1e-3)]
    pub learning_rate: LearningRate,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Number of cross-validation folds
    #[config(default = 10)]
    pub num_folds: usize,

    /// Seed for shuffling and embedding initialization
    #[config(default = 10)]
    pub seed: u64,

    /// Directory receiving one sub-directory per run
    #[config(default = "\"runs\".to_string()")]
    pub runs_dir: String,

    /// Where the CSV report is written
    #[config(default = "\"reports/results.csv\".to_string()")]
    pub report_path: String,
}

impl Config {
    /// Check the hyperparameters before any data is loaded
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.filter_sizes.is_empty() || self.filter_sizes.contains(&0) {
            return Err(anyhow!(
                "Filter sizes must be positive, got {:?}",
                self.filter_sizes
            ));
        }

        if self.num_filters == 0 || self.embedding_dim == 0 || self.batch_size == 0 {
            return Err(anyhow!(
                "num_filters, embedding_dim and batch_size must be positive"
            ));
        }

        if !(self.dropout_keep_prob > 0.0 && self.dropout_keep_prob <= 1.0) {
            return Err(anyhow!(
                "dropout_keep_prob must be in (0, 1], got {}",
                self.dropout_keep_prob
            ));
        }

        Ok(())
    }

    /// The fold files described by this configuration
    pub fn folds(&self) -> Folds {
        Folds::new(
            PathBuf::from(&self.data_base_path),
            self.train_file_pattern.clone(),
            PathBuf::from(&self.data_file_test),
            PathBuf::from(&self.data_file_valid),
        )
    }

    /// The model configuration for a prepared fold
    pub fn model_config(&self, prepared: &Prepared) -> text_cnn::Config {
        let widest_filter = self.filter_sizes.iter().copied().max().unwrap_or(1);

        // Every convolution needs at least one full window
        let sequence_length = prepared.vocabulary.max_document_length().max(widest_filter);

        text_cnn::Config::new(
            sequence_length,
            prepared.num_classes(),
            prepared.vocabulary.len(),
            self.embedding_dim,
            self.filter_sizes.clone(),
            self.num_filters,
        )
        .with_dropout(1.0 - self.dropout_keep_prob)
    }
}

/// Train and evaluate every fold, then write the report
pub async fn run<B: AutodiffBackend>(
    config: &Config,
    device: B::Device,
) -> anyhow::Result<Report> {
    config.validate()?;

    let run_dir = Path::new(&config.runs_dir).join(timestamp());
    fs::create_dir_all(&run_dir)?;

    config
        .save(run_dir.join(TRAINING_CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to save training config: {}", e))?;

    let folds = config.folds();
    let mut report = Report::default();

    for fold in 0..config.num_folds {
        info!("Loading data for fold {}...", fold);

        let split = folds.load(fold).await?;
        let prepared = preprocess(split, config.seed)?;

        let out_dir = run_dir.join(format!("fold-{fold}"));
        let result = train_fold::<B>(config, fold, &prepared, &out_dir, &device).await?;

        report.push(result);
    }

    if let Some(means) = report.means() {
        info!("evaluation in cat");
        info!("acc: {}, f1: {}", means.acc_in_cat, means.f1_in_cat);
        info!("evaluation out of cat");
        info!("acc: {}, f1: {}", means.acc_out_of_cat, means.f1_out_of_cat);
    }

    report.write_csv(&config.report_path)?;
    info!("Report written to {}", config.report_path);

    Ok(report)
}

/// Train a model on one fold and score it on the test, validation and per-category sets
pub async fn train_fold<B: AutodiffBackend>(
    config: &Config,
    fold: usize,
    prepared: &Prepared,
    out_dir: &Path,
    device: &B::Device,
) -> anyhow::Result<FoldResult> {
    info!("Writing to {:?}", out_dir);
    fs::create_dir_all(out_dir)?;

    let num_classes = prepared.num_classes();
    if num_classes == 0 {
        return Err(anyhow!("Classes are not defined for fold {}", fold));
    }

    let model_config = config.model_config(prepared);

    model_config
        .save(out_dir.join(MODEL_CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to save model config: {}", e))?;
    prepared.vocabulary.save(out_dir.join(VOCABULARY_FILE))?;
    fs::write(
        out_dir.join(LABELS_FILE),
        serde_json::to_string(&prepared.labels)?,
    )?;

    info!("Load word2vec file {}", config.embedding_path);

    let embeddings = word2vec::load(
        &prepared.vocabulary,
        &config.embedding_path,
        config.embedding_bin,
        config.embedding_dim,
        config.seed,
    )
    .await
    .map_err(|e| anyhow!("Unable to load {}: {}", config.embedding_path, e))?;

    info!(
        "word2vec file has been loaded, {} of {} words found",
        embeddings.found, embeddings.rows
    );

    let mut model = model_config
        .init::<B>(device)
        .with_embedding(embeddings.to_tensor(device));

    // Initialize optimizer
    let mut optimizer = AdamConfig::new()
        .with_epsilon(config.adam_epsilon)
        .init::<B, text_cnn::Model<B>>();

    // Initialize batchers for training and evaluation data
    let batcher_train = Batcher::<B>::new(model_config.sequence_length, device.clone());
    let batcher_eval =
        Batcher::<B::InnerBackend>::new(model_config.sequence_length, device.clone());

    // Reshuffled every epoch
    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .build(InMemDataset::new(prepared.train.clone()));

    let summaries = out_dir.join("summaries");
    let mut train_writer = SummaryWriter::create(summaries.join("train"))?;
    let mut dev_writer = SummaryWriter::create(summaries.join("dev"))?;

    let mut checkpointer = Checkpointer::new(out_dir.join("checkpoints"), config.num_checkpoints)?;

    let evaluation_schedule = Schedule::new(config.evaluate_every);
    let checkpoint_schedule = Schedule::new(config.checkpoint_every);

    let evaluate_on = |model: &text_cnn::Model<B::InnerBackend>, items: &[Encoded]| {
        evaluate(
            model,
            &batcher_eval,
            items,
            num_classes,
            config.eval_batch_size,
            config.l2_reg_lambda,
        )
    };

    let mut step = 0;

    for epoch in 1..=config.num_epochs {
        log::debug!("Epoch {}/{}", epoch, config.num_epochs);

        for batch in dataloader_train.iter() {
            let output = model.forward(batch);
            let loss = model.regularized_loss(output.loss.clone(), config.l2_reg_lambda);

            let (predicted, actual) = predictions(&output);
            let accuracy = Confusion::from_pairs(&predicted, &actual, num_classes).accuracy();
            let loss_value = loss.clone().into_scalar().elem::<f64>();

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            step += 1;

            info!("step {}, loss {:.6}, acc {:.6}", step, loss_value, accuracy);
            train_writer.add_scalar(step, "loss", loss_value)?;
            train_writer.add_scalar(step, "accuracy", accuracy)?;
            record_gradients(&mut train_writer, step, &gradient_stats(&model, &grads))?;

            model = optimizer.step(config.learning_rate, model, grads);

            if evaluation_schedule.is_due(step) {
                info!("Test evaluation:");
                let evaluation = evaluate_on(&model.valid(), &prepared.test);
                record_evaluation(&mut dev_writer, step, &evaluation)?;
            }

            if checkpoint_schedule.is_due(step) {
                let path = checkpointer.save::<B, _>(&model, step)?;
                info!("Saved model checkpoint to {:?}", path);
            }
        }
    }

    let model = model.valid();

    info!("End test evaluation:");
    let in_category = evaluate_on(&model, &prepared.test);
    record_evaluation(&mut dev_writer, step, &in_category)?;

    info!("End val evaluation:");
    let out_of_category = evaluate_on(&model, &prepared.valid);
    record_evaluation(&mut dev_writer, step, &out_of_category)?;

    let categories = prepared
        .categories
        .iter()
        .map(|(category, items)| {
            let evaluation = evaluate_on(&model, items);
            info!(
                "{}: {} examples, acc {:.6}  f1 {:.6}",
                category, evaluation.samples, evaluation.accuracy, evaluation.f1
            );

            CategoryScore::new(category.clone(), evaluation.f1, evaluation.accuracy)
        })
        .collect();

    let model_path = out_dir.join(MODEL_FILE);
    let recorder = CompactRecorder::new();
    Recorder::<B::InnerBackend>::record(&recorder, model.into_record(), model_path.clone())
        .map_err(|e| anyhow!("Unable to save model to {:?}: {}", model_path, e))?;

    Ok(FoldResult::from_evaluations(
        fold,
        &in_category,
        &out_of_category,
        categories,
    ))
}

fn record_evaluation(
    writer: &mut SummaryWriter,
    step: usize,
    evaluation: &Evaluation,
) -> anyhow::Result<()> {
    info!(
        "step {}, loss {:.6}, acc {:.6}  f1 {:.6}",
        step, evaluation.loss, evaluation.accuracy, evaluation.f1
    );

    writer.add_scalar(step, "loss", evaluation.loss)?;
    writer.add_scalar(step, "accuracy", evaluation.accuracy)?;
    writer.add_scalar(step, "f1", evaluation.f1)?;

    Ok(())
}

fn record_gradients(
    writer: &mut SummaryWriter,
    step: usize,
    stats: &[GradientStats],
) -> anyhow::Result<()> {
    for stat in stats {
        writer.add_scalar(step, &format!("{}/grad/sparsity", stat.name), stat.sparsity)?;
        writer.add_scalar(step, &format!("{}/grad/hist/min", stat.name), stat.min)?;
        writer.add_scalar(step, &format!("{}/grad/hist/max", stat.name), stat.max)?;
        writer.add_scalar(step, &format!("{}/grad/hist/mean", stat.name), stat.mean)?;
    }

    Ok(())
}

fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}
