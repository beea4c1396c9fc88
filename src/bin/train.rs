//! Command line tool to run cross-validated training

use burn::config::Config as _;
use burn_text_cnn::{
    cli::{
        backend::{self, TrainingBackend},
        parse_filter_sizes, Device,
    },
    pipelines::text_classification::{self, Config},
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: train [OPTIONS]

Options:
  -h, --help                 Print help
  -c, --config               Start from a saved training config (JSON)
      --device               Device to train on: 'cpu', 'cuda' or 'cuda:N' (defaults to 'cpu')

Data:
  -d, --data-base-path       Directory holding the per-fold training files
      --train-file-pattern   Training file name, '{fold}' is replaced by the fold index
      --data-file-test       In-category test data
      --data-file-valid      Out-of-category validation data
      --num-folds            Number of cross-validation folds

Embeddings:
      --embedding-path       Pretrained word2vec file
      --embedding-text       The embedding file is in the text format
      --embedding-dim        Dimensionality of the word embeddings

Model:
      --filter-sizes         Comma-separated filter sizes (e.g., '3,4,5')
      --num-filters          Number of filters per filter size
      --dropout-keep-prob    Dropout keep probability
      --l2-reg-lambda        L2 regularization lambda

Training:
  -b, --batch-size           Batch size
      --eval-batch-size      Batch size used when evaluating
  -n, --num-epochs           Number of epochs to train for
      --learning-rate        Adam learning rate
      --adam-epsilon         Adam epsilon
      --evaluate-every       Evaluate on the test set after this many steps
      --checkpoint-every     Save a checkpoint after this many steps
      --num-checkpoints      Number of checkpoints to keep
      --seed                 Seed for shuffling and embedding initialization

Output:
      --runs-dir             Directory receiving summaries, checkpoints and models
  -r, --report-path          Where the CSV report is written
";

#[derive(Debug)]
struct Args {
    config: Option<String>,
    device: Option<String>,
    data_base_path: Option<String>,
    train_file_pattern: Option<String>,
    data_file_test: Option<String>,
    data_file_valid: Option<String>,
    num_folds: Option<usize>,
    embedding_path: Option<String>,
    embedding_text: bool,
    embedding_dim: Option<usize>,
    filter_sizes: Option<String>,
    num_filters: Option<usize>,
    dropout_keep_prob: Option<f64>,
    l2_reg_lambda: Option<f64>,
    batch_size: Option<usize>,
    eval_batch_size: Option<usize>,
    num_epochs: Option<usize>,
    learning_rate: Option<f64>,
    adam_epsilon: Option<f32>,
    evaluate_every: Option<usize>,
    checkpoint_every: Option<usize>,
    num_checkpoints: Option<usize>,
    seed: Option<u64>,
    runs_dir: Option<String>,
    report_path: Option<String>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        Self::from_arguments(Arguments::from_env())
    }

    fn from_arguments(mut pargs: Arguments) -> anyhow::Result<Option<Self>> {
        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            device: pargs.opt_value_from_str("--device")?,
            data_base_path: pargs.opt_value_from_str(["-d", "--data-base-path"])?,
            train_file_pattern: pargs.opt_value_from_str("--train-file-pattern")?,
            data_file_test: pargs.opt_value_from_str("--data-file-test")?,
            data_file_valid: pargs.opt_value_from_str("--data-file-valid")?,
            num_folds: pargs.opt_value_from_str("--num-folds")?,
            embedding_path: pargs.opt_value_from_str("--embedding-path")?,
            embedding_text: pargs.contains("--embedding-text"),
            embedding_dim: pargs.opt_value_from_str("--embedding-dim")?,
            filter_sizes: pargs.opt_value_from_str("--filter-sizes")?,
            num_filters: pargs.opt_value_from_str("--num-filters")?,
            dropout_keep_prob: pargs.opt_value_from_str("--dropout-keep-prob")?,
            l2_reg_lambda: pargs.opt_value_from_str("--l2-reg-lambda")?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            eval_batch_size: pargs.opt_value_from_str("--eval-batch-size")?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            learning_rate: pargs.opt_value_from_str("--learning-rate")?,
            adam_epsilon: pargs.opt_value_from_str("--adam-epsilon")?,
            evaluate_every: pargs.opt_value_from_str("--evaluate-every")?,
            checkpoint_every: pargs.opt_value_from_str("--checkpoint-every")?,
            num_checkpoints: pargs.opt_value_from_str("--num-checkpoints")?,
            seed: pargs.opt_value_from_str("--seed")?,
            runs_dir: pargs.opt_value_from_str("--runs-dir")?,
            report_path: pargs.opt_value_from_str(["-r", "--report-path"])?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow::anyhow!("Unexpected arguments: {:?}", remaining));
        }

        Ok(Some(args))
    }

    /// Apply the command line overrides on top of a base config
    fn apply(self, mut config: Config) -> anyhow::Result<Config> {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    config.$field = value;
                })*
            };
        }

        set!(
            data_base_path,
            train_file_pattern,
            data_file_test,
            data_file_valid,
            num_folds,
            embedding_path,
            embedding_dim,
            num_filters,
            dropout_keep_prob,
            l2_reg_lambda,
            batch_size,
            eval_batch_size,
            num_epochs,
            learning_rate,
            adam_epsilon,
            evaluate_every,
            checkpoint_every,
            num_checkpoints,
            seed,
            runs_dir,
            report_path
        );

        if let Some(filter_sizes) = &self.filter_sizes {
            config.filter_sizes = parse_filter_sizes(filter_sizes)?;
        }

        if self.embedding_text {
            config.embedding_bin = false;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let base = match &args.config {
        Some(path) => Config::load(path)
            .map_err(|e| anyhow::anyhow!("Unable to load config file {}: {}", path, e))?,
        None => Config::new(),
    };

    let device = match &args.device {
        Some(device) => Device::try_from(device.as_str())?,
        None => Device::Cpu,
    };
    let device = backend::resolve(device)?;

    let config = args.apply(base)?;

    log::info!(
        "Running the {} pipeline over {} folds",
        text_classification::PIPELINE,
        config.num_folds
    );

    let report = text_classification::run::<TrainingBackend>(&config, device).await?;

    if let Some(means) = report.means() {
        println!("evaluation in cat");
        println!("acc: {}, f1: {}", means.acc_in_cat, means.f1_in_cat);
        println!("evaluation out of cat");
        println!("acc: {}, f1: {}", means.acc_out_of_cat, means.f1_out_of_cat);
    }

    Ok(())
}
