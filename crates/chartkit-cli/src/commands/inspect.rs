//! Inspect command implementation.

use std::path::Path;

use anyhow::Result;
use chartkit::convert::measure_start_times;
use chartkit::{ChartCourse, ChartProject, ConvertConfig, FumenChart, read_fumen_file};
use owo_colors::OwoColorize;

use crate::cli_utils::{ChartFormat, load_chart};

pub fn run(file: &Path, json: bool, config: &ConvertConfig) -> Result<()> {
    if ChartFormat::from_path(file)? == ChartFormat::Fumen {
        let fumen = read_fumen_file(file)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&fumen)?);
        } else {
            print_fumen(file, &fumen);
        }
        return Ok(());
    }

    let project = load_chart(file, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else {
        print_project(file, &project);
    }
    Ok(())
}

fn print_fumen(file: &Path, fumen: &FumenChart) {
    let difficulty: &'static str = fumen.difficulty().into();
    println!("{}", file.display().bold());
    println!("  Difficulty: {}", difficulty);
    println!("  Measures:   {}", fumen.measure_count());
    println!("  Notes:      {}", fumen.note_count());
    if fumen.has_divergent_paths() {
        println!("  {}", "Divergent paths".yellow());
    }

    println!();
    println!(
        "  {:>4}  {:>10}  {:>8}  {:>5}  {}",
        "#".dimmed(),
        "start".dimmed(),
        "bpm".dimmed(),
        "notes".dimmed(),
        "flags".dimmed()
    );
    for (index, (measure, start)) in fumen
        .measures
        .iter()
        .zip(measure_start_times(fumen))
        .enumerate()
    {
        let mut flags = Vec::new();
        if measure.data.is_gogo_time {
            flags.push("gogo");
        }
        if !measure.data.is_bar_line_visible {
            flags.push("hidden");
        }
        println!(
            "  {:>4}  {:>10.3}  {:>8.3}  {:>5}  {}",
            index,
            start.seconds,
            measure.data.bpm,
            measure.note_count(),
            flags.join(",")
        );
    }
}

fn print_project(file: &Path, project: &ChartProject) {
    let title = if project.title.is_empty() {
        "(untitled)"
    } else {
        project.title.as_str()
    };
    println!("{} {}", title.bold(), format!("({})", file.display()).dimmed());
    println!("  Duration: {}", project.duration);
    println!("  Courses:  {}", project.courses.len());

    for (index, course) in project.courses.iter().enumerate() {
        print_course(index, course);
    }
}

fn print_course(index: usize, course: &ChartCourse) {
    let difficulty: &'static str = course.difficulty.into();
    println!();
    println!(
        "  {} {} level {}",
        format!("[{}]", index).dimmed(),
        difficulty.green(),
        course.level
    );
    println!(
        "    Notes:      {} normal, {} expert, {} master",
        course.notes_normal.len(),
        course.notes_expert.len(),
        course.notes_master.len()
    );
    println!("    Tempos:     {}", course.tempo_map.tempo().len());
    println!("    Signatures: {}", course.tempo_map.signature().len());
    println!("    Go-go:      {}", course.gogo_ranges.len());
    println!("    Last beat:  {}", course.max_used_beat());
}
