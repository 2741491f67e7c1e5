//! Convert command implementation.

use std::path::Path;

use anyhow::Result;
use chartkit::ConvertConfig;
use owo_colors::OwoColorize;
use tracing::info;

use crate::cli_utils::{load_chart, save_chart};

pub fn run(
    input: &Path,
    output: &Path,
    course: Option<usize>,
    config: &ConvertConfig,
) -> Result<()> {
    let project = load_chart(input, config)?;
    let course = course.unwrap_or(config.target_course);
    info!(
        "Loaded {} course(s) from {}",
        project.courses.len(),
        input.display()
    );

    save_chart(output, &project, course, config)?;

    eprintln!(
        "{} {} -> {}",
        "Converted".green(),
        input.display(),
        output.display()
    );
    Ok(())
}
