use serde::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr, IntoStaticStr};

use super::{
    BarLineChange, BranchType, GoGoRange, JposScrollChange, LyricChange, Note, ScrollChange,
    ScrollType,
};
use crate::timing::{Beat, SortedList, TempoMap, Time};

/// Course difficulty, numbered the way TJA `COURSE:` values are.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    FromRepr,
    EnumIter,
    IntoStaticStr,
)]
#[repr(u8)]
pub enum DifficultyType {
    Easy = 0,
    Normal = 1,
    Hard = 2,
    #[default]
    Oni = 3,
    OniUra = 4,
}

impl DifficultyType {
    /// Out of range values clamp to the nearest tier.
    pub fn from_index(index: i32) -> Self {
        Self::from_repr(index.clamp(0, 4) as u8).unwrap_or_default()
    }
}

/// Song select side a course appears on (TJA `SIDE:`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromRepr, IntoStaticStr,
)]
#[repr(u8)]
pub enum SongSelectSide {
    Normal = 1,
    Ex = 2,
    #[default]
    Both = 3,
}

impl SongSelectSide {
    pub fn from_index(index: i32) -> Self {
        Self::from_repr(index.clamp(1, 3) as u8).unwrap_or_default()
    }
}

/// Free-form `KEY:value` pair carried through unchanged.
pub type MetadataEntry = (String, String);

pub const LEVEL_MIN: i32 = 1;
pub const LEVEL_MAX: i32 = 10;
pub const LEVEL_DECIMAL_MAX: i32 = 9;
pub const TOWER_LIVES_MIN: i32 = 0;
pub const TOWER_LIVES_MAX: i32 = 99;

/// One playable difficulty of a chart project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartCourse {
    pub difficulty: DifficultyType,
    pub level: i32,
    /// 0 when the level carries no decimal tag.
    pub level_decimal: i32,
    pub style: i32,
    pub player_side: i32,
    pub creator: String,
    pub life: i32,
    pub side: SongSelectSide,
    pub score_init: i32,
    pub score_diff: i32,
    pub other_metadata: Vec<MetadataEntry>,

    pub tempo_map: TempoMap,
    pub notes_normal: SortedList<Note>,
    pub notes_expert: SortedList<Note>,
    pub notes_master: SortedList<Note>,
    pub gogo_ranges: SortedList<GoGoRange>,
    pub scroll_changes: SortedList<ScrollChange>,
    pub scroll_types: SortedList<ScrollType>,
    pub jpos_scroll_changes: SortedList<JposScrollChange>,
    pub bar_line_changes: SortedList<BarLineChange>,
    pub lyrics: SortedList<LyricChange>,
}

impl Default for ChartCourse {
    fn default() -> Self {
        Self {
            difficulty: DifficultyType::default(),
            level: LEVEL_MIN,
            level_decimal: 0,
            style: 1,
            player_side: 1,
            creator: String::new(),
            life: TOWER_LIVES_MIN,
            side: SongSelectSide::default(),
            score_init: 0,
            score_diff: 0,
            other_metadata: Vec::new(),
            tempo_map: TempoMap::default(),
            notes_normal: SortedList::new(),
            notes_expert: SortedList::new(),
            notes_master: SortedList::new(),
            gogo_ranges: SortedList::new(),
            scroll_changes: SortedList::new(),
            scroll_types: SortedList::new(),
            jpos_scroll_changes: SortedList::new(),
            bar_line_changes: SortedList::new(),
            lyrics: SortedList::new(),
        }
    }
}

impl ChartCourse {
    pub fn notes(&self, branch: BranchType) -> &SortedList<Note> {
        match branch {
            BranchType::Normal => &self.notes_normal,
            BranchType::Expert => &self.notes_expert,
            BranchType::Master => &self.notes_master,
        }
    }

    pub fn notes_mut(&mut self, branch: BranchType) -> &mut SortedList<Note> {
        match branch {
            BranchType::Normal => &mut self.notes_normal,
            BranchType::Expert => &mut self.notes_expert,
            BranchType::Master => &mut self.notes_master,
        }
    }

    /// Latest beat referenced by any event, long note ends included.
    pub fn max_used_beat(&self) -> Beat {
        find_max_used_beat(self)
    }
}

/// Latest beat referenced by any event of `course`, long note and go-go
/// range ends included.
///
/// Every entry is visited rather than only the last of each list, since a
/// long note early in a list can end after later entries.
pub fn find_max_used_beat(course: &ChartCourse) -> Beat {
    let map = &course.tempo_map;
    let notes = [BranchType::Normal, BranchType::Expert, BranchType::Master]
        .into_iter()
        .flat_map(|branch| course.notes(branch).iter().map(Note::end));

    map.tempo()
        .iter()
        .map(|it| it.beat)
        .chain(map.signature().iter().map(|it| it.beat))
        .chain(notes)
        .chain(course.gogo_ranges.iter().map(GoGoRange::end))
        .chain(course.scroll_changes.iter().map(|it| it.beat))
        .chain(course.scroll_types.iter().map(|it| it.beat))
        .chain(course.jpos_scroll_changes.iter().map(|it| it.beat))
        .chain(course.bar_line_changes.iter().map(|it| it.beat))
        .chain(course.lyrics.iter().map(|it| it.beat))
        .fold(Beat::ZERO, Beat::max)
}

/// A complete chart: song level metadata and one or more courses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartProject {
    pub duration: Time,
    pub title: String,
    pub title_localized: Vec<MetadataEntry>,
    pub subtitle: String,
    pub subtitle_localized: Vec<MetadataEntry>,
    pub creator: String,
    pub genre: String,
    pub lyrics_file_name: String,
    pub song_offset: Time,
    pub song_demo_start: Time,
    pub song_file_name: String,
    pub song_jacket: String,
    pub song_volume: f32,
    pub sound_effect_volume: f32,
    pub background_image_file_name: String,
    pub background_movie_file_name: String,
    pub movie_offset: Time,
    pub other_metadata: Vec<MetadataEntry>,
    pub courses: Vec<ChartCourse>,
}

impl ChartProject {
    /// Length used when a chart has no duration of its own.
    pub const DEFAULT_DURATION: Time = Time::from_sec(60.0);

    pub fn duration_or_default(&self) -> Time {
        if self.duration.seconds <= 0.0 {
            Self::DEFAULT_DURATION
        } else {
            self.duration
        }
    }

    pub fn course(&self, index: usize) -> Option<&ChartCourse> {
        self.courses.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::NoteType;
    use crate::timing::{Tempo, TempoChange, TimeSignature};

    #[test]
    fn test_difficulty_from_index_clamps() {
        assert_eq!(DifficultyType::from_index(0), DifficultyType::Easy);
        assert_eq!(DifficultyType::from_index(4), DifficultyType::OniUra);
        assert_eq!(DifficultyType::from_index(9), DifficultyType::OniUra);
        assert_eq!(DifficultyType::from_index(-3), DifficultyType::Easy);
        assert_eq!(SongSelectSide::from_index(0), SongSelectSide::Normal);
    }

    #[test]
    fn test_max_used_beat_includes_long_note_end() {
        let mut course = ChartCourse {
            tempo_map: TempoMap::with_initial(Tempo::new(120.0), TimeSignature::COMMON),
            ..Default::default()
        };
        let mut roll = Note::new(Beat::from_beats(2), NoteType::Drumroll);
        roll.beat_duration = Beat::from_beats(10);
        course.notes_normal.insert_or_update(roll);
        course
            .notes_normal
            .insert_or_update(Note::new(Beat::from_beats(5), NoteType::Don));

        assert_eq!(find_max_used_beat(&course), Beat::from_beats(12));
    }

    #[test]
    fn test_max_used_beat_sees_every_list() {
        let mut course = ChartCourse::default();
        course
            .tempo_map
            .insert_tempo(TempoChange::new(Beat::from_bars(3), Tempo::new(90.0)));
        course.lyrics.insert_or_update(LyricChange {
            beat: Beat::from_bars(5),
            lyric: "la".to_string(),
        });
        course
            .notes_master
            .insert_or_update(Note::new(Beat::from_bars(4), NoteType::Ka));

        assert_eq!(course.max_used_beat(), Beat::from_bars(5));
    }

    #[test]
    fn test_duration_or_default() {
        let mut project = ChartProject::default();
        assert_eq!(project.duration_or_default(), ChartProject::DEFAULT_DURATION);

        project.duration = Time::from_sec(90.5);
        assert_eq!(project.duration_or_default(), Time::from_sec(90.5));
    }

    #[test]
    fn test_notes_by_branch() {
        let mut course = ChartCourse::default();
        course
            .notes_mut(BranchType::Expert)
            .insert_or_update(Note::new(Beat::ZERO, NoteType::Don));

        assert!(course.notes(BranchType::Normal).is_empty());
        assert_eq!(course.notes(BranchType::Expert).len(), 1);
    }
}
