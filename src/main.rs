use std::path::PathBuf;
use std::process;

use clap::Parser;

use coco_match::config::{EvalConfig, FalseNegativeScope};
use coco_match::evaluator::SampleEvaluator;
use coco_match::loader::load_from_file;
use coco_match::store::JsonLinesStore;

/// Match predicted detections to ground truth per sample across IoU thresholds.
#[derive(Parser)]
#[command(name = "coco-match")]
struct Cli {
    /// Path to the samples JSON file
    #[arg(long)]
    samples: PathBuf,

    /// Output file, one JSON evaluation per line
    #[arg(long)]
    output: PathBuf,

    /// JSON config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field holding predicted detections
    #[arg(long)]
    pred_field: Option<String>,

    /// Field holding ground truth detections
    #[arg(long)]
    gt_field: Option<String>,

    /// IoU thresholds (comma-separated, e.g. "0.5,0.75")
    #[arg(long, value_delimiter = ',')]
    iou_thresholds: Option<Vec<f64>>,

    /// Ground truth attribute marking crowd regions
    #[arg(long)]
    crowd_attribute: Option<String>,

    /// Categories whose unmatched ground truths count as false negatives
    #[arg(long, value_enum)]
    false_negatives: Option<FalseNegativeScope>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    log::info!("Loading samples from {}", cli.samples.display());
    let dataset = load_from_file(&cli.samples)?;

    let evaluator = SampleEvaluator::new(config)?;
    let mut store = JsonLinesStore::create(&cli.output)?;
    let stats = evaluator.evaluate_samples(&dataset.samples, &mut store)?;

    log::info!("Output written to {}", cli.output.display());
    stats.print_summary();
    Ok(())
}

fn build_config(cli: &Cli) -> Result<EvalConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => EvalConfig::from_file(path)?,
        None => EvalConfig::default(),
    };

    if let Some(pred_field) = &cli.pred_field {
        config.pred_field = pred_field.clone();
    }
    if let Some(gt_field) = &cli.gt_field {
        config.gt_field = gt_field.clone();
    }
    if let Some(iou_thresholds) = &cli.iou_thresholds {
        config.iou_thresholds = iou_thresholds.clone();
    }
    if let Some(crowd_attribute) = &cli.crowd_attribute {
        config.crowd_attribute = crowd_attribute.clone();
    }
    if let Some(scope) = cli.false_negatives {
        config.false_negative_scope = scope;
    }

    Ok(config)
}
