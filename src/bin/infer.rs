//! Command line tool for classifying text with a trained fold

use anyhow::{anyhow, Result};
use burn_text_cnn::{
    cli::{
        backend::{self, Backend},
        Device,
    },
    pipelines::text_classification::infer,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer ARTIFACT_DIR TEXT... [OPTIONS]

Arguments:
  ARTIFACT_DIR         A fold directory written by 'train' (e.g., 'runs/1700000000/fold-0')
  TEXT                 One or more texts to classify

Options:
  -h, --help           Print help
  --device             Device to run on: 'cpu', 'cuda' or 'cuda:N' (defaults to 'cpu')
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// The device to use
    device: Option<String>,

    /// The fold directory holding the trained model
    artifact_dir: Option<String>,

    /// The texts to classify
    samples: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut pargs = Arguments::from_env();

    let help = pargs.contains(["-h", "--help"]);
    let device = pargs.opt_value_from_str("--device")?;
    let artifact_dir = pargs.opt_free_from_str()?;

    let samples = pargs
        .finish()
        .into_iter()
        .map(|s| {
            s.into_string()
                .map_err(|s| anyhow!("Text is not valid UTF-8: {:?}", s))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Args {
        help,
        device,
        artifact_dir,
        samples,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = parse_args()?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    let artifact_dir = args
        .artifact_dir
        .ok_or_else(|| anyhow!("Missing required argument: ARTIFACT_DIR"))?;

    if args.samples.is_empty() {
        return Err(anyhow!("Missing required argument: TEXT"));
    }

    let device = match &args.device {
        Some(device) => Device::try_from(device.as_str())?,
        None => Device::Cpu,
    };

    // Get model predictions
    let predictions = infer::<Backend>(backend::resolve(device)?, &artifact_dir, &args.samples)?;

    // Print out predictions for each sample
    for (i, (text, prediction)) in args.samples.iter().zip(predictions).enumerate() {
        println!(
            "\n=== Item {i} ===\
             \n- Text: {text}\
             \n- Class: {}\
             \n- Confidence: {:.4}\
             \n================",
            prediction.label, prediction.confidence
        );
    }

    Ok(())
}
