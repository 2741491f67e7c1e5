//! CLI argument parsing tests.
//!
//! These tests check that command-line arguments are parsed correctly
//! without running the commands.

use std::path::PathBuf;

use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "chartkit")]
struct Args {
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Inspect {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        course: Option<usize>,
    },
    Compare {
        a: PathBuf,
        b: PathBuf,
    },
    Roundtrip {
        file: PathBuf,
    },
}

#[test]
fn test_parse_requires_subcommand() {
    assert!(Args::try_parse_from(["chartkit"]).is_err());
}

#[test]
fn test_parse_inspect() {
    let args = Args::try_parse_from(["chartkit", "inspect", "song_m.bin"]).unwrap();
    match args.command {
        Command::Inspect { file, json } => {
            assert_eq!(file, PathBuf::from("song_m.bin"));
            assert!(!json);
        }
        _ => panic!("Expected Inspect command"),
    }
    assert!(args.config.is_none());
}

#[test]
fn test_parse_inspect_json() {
    let args = Args::try_parse_from(["chartkit", "inspect", "song.json", "--json"]).unwrap();
    match args.command {
        Command::Inspect { json, .. } => assert!(json),
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_parse_convert_with_course() {
    let args = Args::try_parse_from([
        "chartkit",
        "convert",
        "song.tja.json",
        "song_h.bin",
        "--course",
        "2",
    ])
    .unwrap();
    match args.command {
        Command::Convert {
            input,
            output,
            course,
        } => {
            assert_eq!(input, PathBuf::from("song.tja.json"));
            assert_eq!(output, PathBuf::from("song_h.bin"));
            assert_eq!(course, Some(2));
        }
        _ => panic!("Expected Convert command"),
    }
}

#[test]
fn test_parse_convert_requires_output() {
    assert!(Args::try_parse_from(["chartkit", "convert", "song_m.bin"]).is_err());
}

#[test]
fn test_parse_convert_invalid_course() {
    let result = Args::try_parse_from(["chartkit", "convert", "a.bin", "b.json", "--course", "-1"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_compare() {
    let args = Args::try_parse_from(["chartkit", "compare", "a.bin", "b.bin"]).unwrap();
    match args.command {
        Command::Compare { a, b } => {
            assert_eq!(a, PathBuf::from("a.bin"));
            assert_eq!(b, PathBuf::from("b.bin"));
        }
        _ => panic!("Expected Compare command"),
    }
}

#[test]
fn test_parse_global_config_after_subcommand() {
    let args =
        Args::try_parse_from(["chartkit", "roundtrip", "song_m.bin", "--config", "convert.toml"])
            .unwrap();
    assert_eq!(args.config, Some(PathBuf::from("convert.toml")));
    assert!(matches!(args.command, Command::Roundtrip { .. }));
}

#[test]
fn test_parse_global_config_before_subcommand() {
    let args =
        Args::try_parse_from(["chartkit", "--config", "convert.toml", "inspect", "a.bin"]).unwrap();
    assert_eq!(args.config, Some(PathBuf::from("convert.toml")));
}

#[test]
fn test_parse_unknown_subcommand() {
    assert!(Args::try_parse_from(["chartkit", "play", "a.bin"]).is_err());
}
