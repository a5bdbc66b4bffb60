//! phish-train - offline dataset preparation and model training

use anyhow::{Context, Result};
use clap::{Arg, Command, ValueHint};
use std::path::PathBuf;

use phishguard_core::constants::{APP_NAME, APP_VERSION};
use phishguard_core::training::{self, PipelineConfig, Stage};

fn cli() -> Command {
    Command::new("phish-train")
        .version(clap::crate_version!())
        .about("Merge, clean and summarize the phishing datasets, then train and evaluate the classifier")
        .arg(
            Arg::new("data_dir")
                .short('d')
                .long("data-dir")
                .help("Directory holding phishing_uci.csv, phishing_kaggle.csv and the combined output")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .help("Path the trained model artifact is written to and evaluated from")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("trees")
                .long("trees")
                .help("Number of trees in the forest")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for the train/test split and the forest")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("test_size")
                .long("test-size")
                .help("Held-out proportion, strictly between 0 and 1")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("stage")
                .short('s')
                .long("stage")
                .help("Pipeline stage to run")
                .value_parser(Stage::NAMES)
                .default_value("all"),
        )
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    let mut config = PipelineConfig::default();
    if let Some(dir) = matches.get_one::<PathBuf>("data_dir") {
        config.data_dir = dir.clone();
    }
    if let Some(model) = matches.get_one::<PathBuf>("model") {
        config.model_path = model.clone();
    }
    if let Some(trees) = matches.get_one::<usize>("trees") {
        config.n_estimators = *trees;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = *seed;
    }
    if let Some(test_size) = matches.get_one::<f64>("test_size") {
        config.test_size = *test_size;
    }

    let stage: Stage = matches
        .get_one::<String>("stage")
        .map(String::as_str)
        .unwrap_or("all")
        .parse()?;

    log::info!("{} trainer v{}", APP_NAME, APP_VERSION);
    training::run(&config, stage).with_context(|| format!("pipeline stage '{}' failed", stage))?;
    log::info!("Done");
    Ok(())
}
