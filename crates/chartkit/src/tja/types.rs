use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::chart::{DifficultyType, MetadataEntry, ScrollMethod};
use crate::timing::{Beat, Complex, Tempo, Time, TimeSignature};

/// Note symbols of a TJA measure line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
pub enum TjaNoteType {
    #[default]
    None,
    Don,
    Ka,
    DonBig,
    KaBig,
    StartDrumroll,
    StartDrumrollBig,
    StartBalloon,
    EndBalloonOrDrumroll,
    StartBalloonSpecial,
    DonBigBoth,
    KaBigBoth,
    Bomb,
    Fuse,
    Hidden,
    KaDon,
}

impl TjaNoteType {
    pub fn symbol(self) -> char {
        match self {
            Self::None => '0',
            Self::Don => '1',
            Self::Ka => '2',
            Self::DonBig => '3',
            Self::KaBig => '4',
            Self::StartDrumroll => '5',
            Self::StartDrumrollBig => '6',
            Self::StartBalloon => '7',
            Self::EndBalloonOrDrumroll => '8',
            Self::StartBalloonSpecial => '9',
            Self::DonBigBoth => 'A',
            Self::KaBigBoth => 'B',
            Self::Bomb => 'C',
            Self::Fuse => 'D',
            Self::Hidden => 'F',
            Self::KaDon => 'G',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|it| it.symbol() == c)
    }

    /// Consumes one entry of the course `BALLOON:` list.
    pub fn takes_balloon_count(self) -> bool {
        matches!(self, Self::StartBalloon | Self::StartBalloonSpecial | Self::Fuse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TjaNote {
    pub time: Beat,
    pub note_type: TjaNoteType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TjaTempoChange {
    pub time: Beat,
    pub tempo: Tempo,
}

/// `#DELAY`: judgement offset applied to the notes that follow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TjaDelayChange {
    pub time: Beat,
    pub delay: Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TjaScrollChange {
    pub time: Beat,
    pub scroll_speed: Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TjaScrollType {
    pub time: Beat,
    pub method: ScrollMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TjaJposScroll {
    pub time: Beat,
    pub movement: Complex,
    pub duration_sec: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TjaBarLineChange {
    pub time: Beat,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TjaLyricChange {
    pub time: Beat,
    pub lyric: String,
}

/// `#GOGOSTART` (`is_gogo`) or `#GOGOEND`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TjaGoGoChange {
    pub time: Beat,
    pub is_gogo: bool,
}

/// One measure of a parsed course.
///
/// `start` is absolute; every event `time` is relative to `start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TjaMeasure {
    pub start: Beat,
    pub time_signature: TimeSignature,
    pub notes: Vec<TjaNote>,
    pub tempo_changes: Vec<TjaTempoChange>,
    pub delay_changes: Vec<TjaDelayChange>,
    pub scroll_changes: Vec<TjaScrollChange>,
    pub scroll_types: Vec<TjaScrollType>,
    pub jpos_scroll_changes: Vec<TjaJposScroll>,
    pub bar_line_changes: Vec<TjaBarLineChange>,
    pub lyric_changes: Vec<TjaLyricChange>,
    pub gogo_changes: Vec<TjaGoGoChange>,
}

impl TjaMeasure {
    pub fn new(start: Beat, time_signature: TimeSignature) -> Self {
        Self {
            start,
            time_signature,
            ..Default::default()
        }
    }
}

/// Absolute go-go span built from paired start/end changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TjaGoGoRange {
    pub start: Beat,
    pub end: Beat,
}

/// Song level `KEY:value` headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TjaMetadata {
    pub title: String,
    pub title_localized: Vec<MetadataEntry>,
    pub subtitle: String,
    pub subtitle_localized: Vec<MetadataEntry>,
    pub maker: String,
    pub genre: String,
    pub lyrics: String,
    pub bpm: Tempo,
    pub offset: Time,
    pub demo_start: Time,
    pub wave: String,
    pub preimage: String,
    pub song_volume: f32,
    pub se_volume: f32,
    pub bg_image: String,
    pub bg_movie: String,
    pub movie_offset: Time,
    pub others: Vec<MetadataEntry>,
}

impl Default for TjaMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            title_localized: Vec::new(),
            subtitle: String::new(),
            subtitle_localized: Vec::new(),
            maker: String::new(),
            genre: String::new(),
            lyrics: String::new(),
            bpm: Tempo::default(),
            offset: Time::ZERO,
            demo_start: Time::ZERO,
            wave: String::new(),
            preimage: String::new(),
            song_volume: 100.0,
            se_volume: 100.0,
            bg_image: String::new(),
            bg_movie: String::new(),
            movie_offset: Time::ZERO,
            others: Vec::new(),
        }
    }
}

/// Course level headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TjaCourseMetadata {
    pub course: DifficultyType,
    pub level: i32,
    pub level_decimal_tag: i32,
    pub style: i32,
    pub start_player_side: i32,
    pub notes_designer: String,
    /// Pop counts consumed in order by balloon-like notes.
    pub balloon: Vec<i32>,
    pub score_init: i32,
    pub score_diff: i32,
    pub life: i32,
    pub side: i32,
    pub others: Vec<MetadataEntry>,
}

impl Default for TjaCourseMetadata {
    fn default() -> Self {
        Self {
            course: DifficultyType::Oni,
            level: 1,
            level_decimal_tag: 0,
            style: 1,
            start_player_side: 1,
            notes_designer: String::new(),
            balloon: Vec::new(),
            score_init: 0,
            score_diff: 0,
            life: 0,
            side: 3,
            others: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TjaCourse {
    pub metadata: TjaCourseMetadata,
    pub measures: Vec<TjaMeasure>,
}

impl TjaCourse {
    /// False for metadata-only sections.
    pub fn has_chart(&self) -> bool {
        !self.measures.is_empty()
    }

    /// Pair go-go start/end changes into absolute ranges.
    ///
    /// Repeated starts and ends without a matching start are ignored. A range
    /// still open after the last measure closes at that measure's start.
    pub fn gogo_ranges(&self) -> Vec<TjaGoGoRange> {
        let mut ranges = Vec::new();
        let mut open: Option<Beat> = None;

        for measure in &self.measures {
            for change in &measure.gogo_changes {
                let at = measure.start + change.time;
                match (open, change.is_gogo) {
                    (None, true) => open = Some(at),
                    (Some(start), false) => {
                        ranges.push(TjaGoGoRange { start, end: at });
                        open = None;
                    }
                    _ => {}
                }
            }
        }

        if let (Some(start), Some(last)) = (open, self.measures.last()) {
            ranges.push(TjaGoGoRange {
                start,
                end: last.start.max(start),
            });
        }
        ranges
    }
}

/// Marker identifying the tool and date that produced a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorComment {
    pub tool: String,
    pub version: String,
    pub date: NaiveDate,
}

impl GeneratorComment {
    pub fn current() -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            date: chrono::Local::now().date_naive(),
        }
    }
}

impl fmt::Display for GeneratorComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "// Created with {} v{} ({})",
            self.tool,
            self.version,
            self.date.format("%Y-%m-%d")
        )
    }
}

/// A parsed TJA file: song headers plus one entry per `COURSE:` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TjaDocument {
    pub metadata: TjaMetadata,
    pub courses: Vec<TjaCourse>,
    pub generator_comment: Option<GeneratorComment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure_with_gogo(bar: i32, flags: &[(i32, bool)]) -> TjaMeasure {
        let mut measure = TjaMeasure::new(Beat::from_bars(bar), TimeSignature::COMMON);
        measure.gogo_changes = flags
            .iter()
            .map(|&(ticks, is_gogo)| TjaGoGoChange {
                time: Beat::from_ticks(ticks),
                is_gogo,
            })
            .collect();
        measure
    }

    #[test]
    fn test_symbols_round_trip() {
        use strum::IntoEnumIterator;
        for note_type in TjaNoteType::iter() {
            assert_eq!(TjaNoteType::from_symbol(note_type.symbol()), Some(note_type));
        }
        assert_eq!(TjaNoteType::from_symbol('E'), None);
    }

    #[test]
    fn test_gogo_ranges_pairing() {
        let course = TjaCourse {
            metadata: TjaCourseMetadata::default(),
            measures: vec![
                measure_with_gogo(0, &[(96, true)]),
                measure_with_gogo(1, &[(0, true)]),
                measure_with_gogo(2, &[(48, false), (96, false)]),
                measure_with_gogo(3, &[(0, true)]),
                measure_with_gogo(4, &[]),
            ],
        };

        assert_eq!(
            course.gogo_ranges(),
            vec![
                TjaGoGoRange {
                    start: Beat::from_ticks(96),
                    end: Beat::from_ticks(384 + 48),
                },
                TjaGoGoRange {
                    start: Beat::from_bars(3),
                    end: Beat::from_bars(4),
                },
            ]
        );
    }

    #[test]
    fn test_has_chart() {
        assert!(!TjaCourse::default().has_chart());
    }

    #[test]
    fn test_generator_comment_display() {
        let comment = GeneratorComment {
            tool: "chartkit".to_string(),
            version: "0.1.0".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        };
        assert_eq!(comment.to_string(), "// Created with chartkit v0.1.0 (2024-03-09)");
    }
}
