use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};

use crate::timing::{Beat, Complex, HasBeat, Time};

/// Playable note kinds of the chart model.
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
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum NoteType {
    #[default]
    Don,
    DonBig,
    Ka,
    KaBig,
    Drumroll,
    DrumrollBig,
    Balloon,
    BalloonSpecial,
    DonBigHand,
    KaBigHand,
    KaDon,
    Adlib,
    Fuse,
    Bomb,
}

impl NoteType {
    pub fn is_drumroll(self) -> bool {
        matches!(self, Self::Drumroll | Self::DrumrollBig)
    }

    /// Notes that need a pop count.
    pub fn is_balloon(self) -> bool {
        matches!(self, Self::Balloon | Self::BalloonSpecial | Self::Fuse)
    }

    /// Notes spanning a duration.
    pub fn is_long(self) -> bool {
        self.is_drumroll() || self.is_balloon()
    }

    pub fn is_big(self) -> bool {
        matches!(
            self,
            Self::DonBig | Self::KaBig | Self::DrumrollBig | Self::DonBigHand | Self::KaBigHand
        )
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Branch path a note list belongs to.
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
    EnumCount,
    IntoStaticStr,
)]
#[repr(u8)]
pub enum BranchType {
    #[default]
    #[strum(serialize = "normal")]
    Normal = 0,
    #[strum(serialize = "expert")]
    Expert = 1,
    #[strum(serialize = "master")]
    Master = 2,
}

impl BranchType {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub beat: Beat,
    pub beat_duration: Beat,
    pub note_type: NoteType,
    /// Judgement offset relative to the beat position.
    pub time_offset: Time,
    pub balloon_pop_count: i16,
}

impl Note {
    pub fn new(beat: Beat, note_type: NoteType) -> Self {
        Self {
            beat,
            note_type,
            ..Default::default()
        }
    }

    pub fn end(&self) -> Beat {
        self.beat + self.beat_duration.max(Beat::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarLineChange {
    pub beat: Beat,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoGoRange {
    pub beat: Beat,
    pub beat_duration: Beat,
}

impl GoGoRange {
    pub fn end(&self) -> Beat {
        self.beat + self.beat_duration.max(Beat::ZERO)
    }

    pub fn contains(&self, beat: Beat) -> bool {
        beat >= self.beat && beat < self.beat + self.beat_duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollChange {
    pub beat: Beat,
    pub scroll_speed: Complex,
}

/// Scroll method switch (`#NMSCROLL`, `#BMSCROLL`, `#HBSCROLL` in TJA).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, FromRepr, IntoStaticStr,
)]
#[repr(i8)]
pub enum ScrollMethod {
    #[default]
    Normal = 0,
    Bm = 1,
    Hb = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollType {
    pub beat: Beat,
    pub method: ScrollMethod,
}

/// Judge position move (`#JPOSSCROLL`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JposScrollChange {
    pub beat: Beat,
    pub movement: Complex,
    pub duration_sec: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricChange {
    pub beat: Beat,
    pub lyric: String,
}

macro_rules! impl_has_beat {
    ($($ty:ty),* $(,)?) => {
        $(impl HasBeat for $ty {
            fn beat(&self) -> Beat {
                self.beat
            }
        })*
    };
}

impl_has_beat!(
    Note,
    BarLineChange,
    GoGoRange,
    ScrollChange,
    ScrollType,
    JposScrollChange,
    LyricChange,
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_note_type_predicates() {
        assert!(NoteType::Drumroll.is_long());
        assert!(NoteType::Fuse.is_balloon());
        assert!(!NoteType::Don.is_long());
        assert!(NoteType::KaBigHand.is_big());
        assert!(!NoteType::Balloon.is_big());
    }

    #[test]
    fn test_note_type_names() {
        assert_eq!(NoteType::BalloonSpecial.name(), "BalloonSpecial");
        assert_eq!(NoteType::from_str("KaDon").unwrap(), NoteType::KaDon);
    }

    #[test]
    fn test_branch_type() {
        assert_eq!(BranchType::from_repr(2), Some(BranchType::Master));
        assert_eq!(BranchType::Expert.name(), "expert");
        assert_eq!(BranchType::COUNT, 3);
    }

    #[test]
    fn test_gogo_range_contains_half_open() {
        let range = GoGoRange {
            beat: Beat::from_bars(1),
            beat_duration: Beat::from_bars(2),
        };
        assert!(range.contains(Beat::from_bars(1)));
        assert!(range.contains(Beat::from_ticks(575)));
        assert!(!range.contains(Beat::from_bars(3)));
        assert_eq!(range.end(), Beat::from_bars(3));
    }

    #[test]
    fn test_note_end_ignores_negative_duration() {
        let mut note = Note::new(Beat::from_beats(4), NoteType::Drumroll);
        note.beat_duration = Beat::from_beats(-1);
        assert_eq!(note.end(), Beat::from_beats(4));
    }
}
