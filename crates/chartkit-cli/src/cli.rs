//! CLI argument definitions for chartkit.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chartkit")]
#[command(about = "Taiko chart converter and inspector", version)]
pub struct Args {
    /// Converter settings (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show a summary of a chart file
    Inspect {
        /// Fumen (.bin, .fumen), chart JSON or TJA JSON (.tja.json)
        file: PathBuf,
        /// Dump the decoded file as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert between chart formats, chosen by file extension
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Course written to Fumen output (default: from config)
        #[arg(long)]
        course: Option<usize>,
    },
    /// List differences between two charts
    Compare { a: PathBuf, b: PathBuf },
    /// Convert a chart to the chart model and back, reporting what changed
    Roundtrip { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let args = Args::try_parse_from([
            "chartkit",
            "convert",
            "song.json",
            "song_m.bin",
            "--course",
            "1",
            "--config",
            "convert.toml",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("convert.toml")));
        match args.command {
            Command::Convert {
                input,
                output,
                course,
            } => {
                assert_eq!(input, PathBuf::from("song.json"));
                assert_eq!(output, PathBuf::from("song_m.bin"));
                assert_eq!(course, Some(1));
            }
            _ => panic!("Expected Convert command"),
        }
    }

    #[test]
    fn test_subcommand_names() {
        let names: Vec<String> = Args::command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["inspect", "convert", "compare", "roundtrip"]);
    }
}
