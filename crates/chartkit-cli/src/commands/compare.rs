//! Compare command implementation.

use std::path::Path;

use anyhow::Result;
use chartkit::{ConvertConfig, compare_charts};
use owo_colors::OwoColorize;

use crate::cli_utils::load_chart;

pub fn run(a: &Path, b: &Path, config: &ConvertConfig) -> Result<()> {
    let left = load_chart(a, config)?;
    let right = load_chart(b, config)?;

    let mut count = 0usize;
    compare_charts(&left, &right, |message: &str| {
        count += 1;
        println!("  {}", message.red());
    });

    if count == 0 {
        println!("{}", "No differences".green());
    } else {
        println!("{} difference(s)", count.to_string().yellow());
    }
    Ok(())
}
