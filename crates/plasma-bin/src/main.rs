use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use clap::{Arg, Command};
use plasma_config::Config;

mod runner;
mod trace;

const COMMAND_RUN: &str = "run";
const COMMAND_EXAMPLE_CONFIG: &str = "generate-example-config";
const ARG_CONFIG: &str = "config";
const ARG_OUTPUT_PATH: &str = "output-path";

fn read_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read(&path)
        .with_context(|| format!("read config file from {}", path.as_ref().to_string_lossy()))?;
    let config = toml::from_slice(&content).with_context(|| "parse config file")?;
    Ok(config)
}

fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = Config::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;
    Ok(())
}

async fn run_cli() -> Result<()> {
    let app = Command::new("Plasma")
        .about("The plasma child chain anchored to a root chain.")
        .subcommand(
            Command::new(COMMAND_RUN)
                .about("Run the plasma node")
                .arg(
                    Arg::new(ARG_CONFIG)
                        .short('c')
                        .takes_value(true)
                        .required(true)
                        .default_value("./config.toml")
                        .help("The config file path"),
                )
                .display_order(0),
        )
        .subcommand(
            Command::new(COMMAND_EXAMPLE_CONFIG)
                .about("Generate an example config file")
                .arg(
                    Arg::new(ARG_OUTPUT_PATH)
                        .short('o')
                        .takes_value(true)
                        .default_value("./config.toml")
                        .help("The output config file path"),
                ),
        )
        .subcommand_required(true);

    let matches = app.get_matches();
    match matches.subcommand() {
        Some((COMMAND_RUN, m)) => {
            let config_path = m.value_of(ARG_CONFIG).expect("config file path");
            let config = read_config(config_path)?;
            runner::run(config).await?;
        }
        Some((COMMAND_EXAMPLE_CONFIG, m)) => {
            let output_path = m.value_of(ARG_OUTPUT_PATH).expect("output file path");
            generate_example_config(output_path)?;
        }
        _ => return Err(anyhow!("unknown subcommand")),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    trace::init()?;
    run_cli().await
}
