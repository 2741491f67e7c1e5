//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use chartkit::fumen::{FumenDifficulty, is_fumen_path};
use chartkit::{
    ChartProject, ConvertConfig, FumenChart, TjaDocument, chart_to_fumen, chart_to_tja,
    fumen_to_chart, read_fumen_file, tja_to_chart, write_fumen_file,
};
use tracing::debug;

const TJA_JSON_SUFFIX: &str = ".tja.json";

/// File kinds the CLI reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Fumen,
    TjaJson,
    ChartJson,
}

impl ChartFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if is_fumen_path(path) {
            Ok(Self::Fumen)
        } else if name.ends_with(TJA_JSON_SUFFIX) {
            Ok(Self::TjaJson)
        } else if name.ends_with(".json") {
            Ok(Self::ChartJson)
        } else {
            anyhow::bail!("Unrecognised chart file extension: {}", path.display())
        }
    }
}

/// Load converter settings from TOML, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<ConvertConfig> {
    let Some(path) = path else {
        return Ok(ConvertConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: ConvertConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.validate()?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read any supported file into the chart model.
pub fn load_chart(path: &Path, config: &ConvertConfig) -> Result<ChartProject> {
    let project = match ChartFormat::from_path(path)? {
        ChartFormat::Fumen => {
            let mut project = fumen_to_chart(&read_fumen_file(path)?, config);
            // The header cannot tell Oni from Ura; a `_x` style suffix can
            let from_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(FumenDifficulty::from_file_name);
            if let (Some(difficulty), Some(course)) = (from_name, project.courses.first_mut()) {
                debug!("Difficulty {:?} from file name", difficulty);
                course.difficulty = difficulty.into();
            }
            project
        }
        ChartFormat::TjaJson => tja_to_chart(&read_json::<TjaDocument>(path)?, config),
        ChartFormat::ChartJson => read_json::<ChartProject>(path)?,
    };
    Ok(project)
}

/// Write `project` in the format implied by `path`.
pub fn save_chart(
    path: &Path,
    project: &ChartProject,
    course: usize,
    config: &ConvertConfig,
) -> Result<()> {
    match ChartFormat::from_path(path)? {
        ChartFormat::Fumen => {
            let fumen: FumenChart = chart_to_fumen(project, course, config)?;
            write_fumen_file(path, &fumen)?;
        }
        ChartFormat::TjaJson => write_json(path, &chart_to_tja(project, config))?,
        ChartFormat::ChartJson => write_json(path, project)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ChartFormat::from_path(Path::new("song_m.bin")).unwrap(), ChartFormat::Fumen);
        assert_eq!(ChartFormat::from_path(Path::new("a.FUMEN")).unwrap(), ChartFormat::Fumen);
        assert_eq!(ChartFormat::from_path(Path::new("song.tja.json")).unwrap(), ChartFormat::TjaJson);
        assert_eq!(ChartFormat::from_path(Path::new("song.json")).unwrap(), ChartFormat::ChartJson);
        assert!(ChartFormat::from_path(Path::new("song.tja")).is_err());
    }

    #[test]
    fn test_missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), ConvertConfig::default());
    }

    #[test]
    fn test_config_from_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "fallback_bpm = 140.0\ntarget_course = 2\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.fallback_bpm, 140.0);
        assert_eq!(config.target_course, 2);
        assert_eq!(config.max_denominator, ConvertConfig::default().max_denominator);

        std::fs::write(&path, "fallback_bpm = -1.0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_save_and_load_each_format() {
        use chartkit::chart::DifficultyType;
        use chartkit::{Beat, Note, NoteType, Tempo, TempoMap, Time, TimeSignature};

        let mut course = chartkit::ChartCourse {
            tempo_map: TempoMap::with_initial(Tempo::new(120.0), TimeSignature::COMMON),
            ..Default::default()
        };
        course
            .notes_normal
            .insert_or_update(Note::new(Beat::from_ticks(48), NoteType::Don));
        let project = ChartProject {
            title: "Song".to_string(),
            duration: Time::from_sec(4.0),
            courses: vec![course],
            ..Default::default()
        };
        let config = ConvertConfig::default();
        let dir = tempfile::TempDir::new().unwrap();

        let json = dir.path().join("song.json");
        save_chart(&json, &project, 0, &config).unwrap();
        assert_eq!(load_chart(&json, &config).unwrap(), project);

        let fumen = dir.path().join("song_m.bin");
        save_chart(&fumen, &project, 0, &config).unwrap();
        let loaded = load_chart(&fumen, &config).unwrap();
        assert_eq!(loaded.courses[0].notes_normal.len(), 1);
        assert_eq!(loaded.courses[0].difficulty, DifficultyType::Oni);
        assert_eq!(loaded.courses[0].notes_normal[0].beat, Beat::from_ticks(48));

        let ura = dir.path().join("song_x.bin");
        save_chart(&ura, &project, 0, &config).unwrap();
        let loaded = load_chart(&ura, &config).unwrap();
        assert_eq!(loaded.courses[0].difficulty, DifficultyType::OniUra);

        let tja = dir.path().join("song.tja.json");
        save_chart(&tja, &project, 0, &config).unwrap();
        let loaded = load_chart(&tja, &config).unwrap();
        assert_eq!(loaded.title, "Song");
        assert_eq!(loaded.courses[0].notes_normal.len(), 1);
    }
}
