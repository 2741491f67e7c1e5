//! Round trip command implementation.

use std::path::Path;

use anyhow::Result;
use chartkit::{
    ConvertConfig, chart_to_fumen, chart_to_tja, collect_differences, fumen_to_chart,
    read_fumen_bytes, tja_to_chart, write_fumen_bytes,
};
use owo_colors::OwoColorize;

use crate::cli_utils::load_chart;

/// Convert `file` through both binary and text representations and report
/// what each pass changes relative to the loaded chart.
pub fn run(file: &Path, config: &ConvertConfig) -> Result<()> {
    let original = load_chart(file, config)?;
    println!("{}", file.display().bold());

    let mut failed = false;
    for index in 0..original.courses.len() {
        let fumen = chart_to_fumen(&original, index, config)?;
        let bytes = write_fumen_bytes(&fumen)?;
        let decoded = read_fumen_bytes(&bytes)?;
        let restored = fumen_to_chart(&decoded, config);
        let again = fumen_to_chart(&chart_to_fumen(&restored, 0, config)?, config);

        let label = format!("course {} via Fumen ({} bytes)", index, bytes.len());
        failed |= report(&label, &collect_differences(&restored, &again));
    }

    let tja = chart_to_tja(&original, config);
    let restored = tja_to_chart(&tja, config);
    let again = tja_to_chart(&chart_to_tja(&restored, config), config);
    failed |= report("all courses via TJA", &collect_differences(&restored, &again));

    if failed {
        anyhow::bail!("Round trip is not stable");
    }
    Ok(())
}

/// Print the differences of one pass; true when there were any.
fn report(label: &str, differences: &[String]) -> bool {
    if differences.is_empty() {
        println!("  {} {}", "stable".green(), label);
        return false;
    }
    println!("  {} {}", "changed".red(), label);
    for message in differences {
        println!("    {}", message.dimmed());
    }
    true
}
