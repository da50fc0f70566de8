use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use attrition_cli::inspect::run_inspect;
use attrition_cli::train::input::TrainConfig;
use attrition_cli::train::trainer;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("ATTRITION_LOG", "error,attrition=info"))
        .init();

    let matches = Command::new("attrition")
        .version(clap::crate_version!())
        .about("Employee attrition prediction with a recurrent sequence classifier")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Prepare data, train the classifier and write evaluation outputs")
                .arg(
                    Arg::new("config")
                        .help("Path to training configuration file (JSON)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the employee table (*.csv or *.tsv). \
                             Overrides the data file specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output_dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Directory that the model, metrics and predictions are written to. \
                             Overrides the directory specified in the configuration file.",
                        )
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("device")
                        .long("device")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Device to train on: cpu, cuda or cuda:<index>"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Load and prepare a dataset without training; print the feature report")
                .arg(
                    Arg::new("data")
                        .help("Path to the employee table (*.csv or *.tsv)")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("inspect", sub_m)) => {
            let data = sub_m
                .get_one::<String>("data")
                .ok_or_else(|| anyhow::anyhow!("Missing data path"))?;
            run_inspect(data)
        }
        _ => unreachable!("subcommand_required prevents this"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path = matches
        .get_one::<PathBuf>("config")
        .ok_or_else(|| anyhow::anyhow!("Missing config path"))?;
    log::info!("[attrition::train] Using config: {:?}", config_path);

    let config = TrainConfig::from_arguments(config_path, matches)?;
    trainer::run_training(&config)
}
