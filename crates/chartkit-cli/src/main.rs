mod cli;
mod cli_utils;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chartkit=warn,chartkit_cli=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = cli_utils::load_config(args.config.as_deref())?;

    match args.command {
        Command::Inspect { file, json } => commands::inspect::run(&file, json, &config),
        Command::Convert {
            input,
            output,
            course,
        } => commands::convert::run(&input, &output, course, &config),
        Command::Compare { a, b } => commands::compare::run(&a, &b, &config),
        Command::Roundtrip { file } => commands::roundtrip::run(&file, &config),
    }
}
