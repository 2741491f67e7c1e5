use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr, IntoStaticStr};

use super::layout;
use crate::chart::{BranchType, DifficultyType};
use crate::config::epsilon;
use crate::config::fumen as constants;
use crate::timing::approx_eq_f32;

/// Difficulty tier of a Fumen file.
///
/// The discriminant is the suffix character used in file names, e.g.
/// `natsu_e.bin` is the Easy chart of song `natsu`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumIter,
    IntoStaticStr,
)]
#[repr(u8)]
pub enum FumenDifficulty {
    Easy = b'e',
    Normal = b'n',
    Hard = b'h',
    Oni = b'm',
    Ura = b'x',
}

impl FumenDifficulty {
    pub fn suffix(self) -> char {
        self as u8 as char
    }

    pub fn from_suffix(c: char) -> Option<Self> {
        u8::try_from(c).ok().and_then(Self::from_repr)
    }

    /// Parse the `_<suffix>` part of a file name such as `song_m.bin`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = Path::new(name).file_stem()?.to_str()?;
        let (_, suffix) = stem.rsplit_once('_')?;
        let mut chars = suffix.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_suffix(c),
            _ => None,
        }
    }

    pub fn clear_hp(self) -> u32 {
        match self {
            Self::Easy => constants::CLEAR_HP_EASY,
            Self::Normal | Self::Hard => constants::CLEAR_HP_NORMAL_HARD,
            Self::Oni | Self::Ura => constants::CLEAR_HP_ONI,
        }
    }

    pub fn judge_timing(self) -> JudgeTimingBlock {
        let (good, ok, bad) = match self {
            Self::Easy | Self::Normal => constants::JUDGE_TIMING_EASY_NORMAL,
            Self::Hard | Self::Oni | Self::Ura => constants::JUDGE_TIMING_HARD_ONI,
        };
        JudgeTimingBlock { good, ok, bad }
    }
}

impl From<DifficultyType> for FumenDifficulty {
    fn from(value: DifficultyType) -> Self {
        match value {
            DifficultyType::Easy => Self::Easy,
            DifficultyType::Normal => Self::Normal,
            DifficultyType::Hard => Self::Hard,
            DifficultyType::Oni => Self::Oni,
            DifficultyType::OniUra => Self::Ura,
        }
    }
}

impl From<FumenDifficulty> for DifficultyType {
    fn from(value: FumenDifficulty) -> Self {
        match value {
            FumenDifficulty::Easy => Self::Easy,
            FumenDifficulty::Normal => Self::Normal,
            FumenDifficulty::Hard => Self::Hard,
            FumenDifficulty::Oni => Self::Oni,
            FumenDifficulty::Ura => Self::OniUra,
        }
    }
}

/// Judge windows in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JudgeTimingBlock {
    pub good: f32,
    pub ok: f32,
    pub bad: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Always written as exactly 36 blocks.
    pub judge_timings: Vec<JudgeTimingBlock>,
    pub has_divergent_paths: u32,
    pub max_hp: u32,
    pub clear_hp: u32,
    pub hp_per_good: i32,
    pub hp_per_ok: i32,
    pub hp_per_bad: i32,
    pub max_combo: u32,
    pub hp_increase_ratio: u32,
    pub hp_increase_ratio_master: u32,
    pub good_diverge_points: u32,
    pub ok_diverge_points: u32,
    pub bad_diverge_points: u32,
    pub drumroll_diverge_points: u32,
    pub good_diverge_points_big: u32,
    pub ok_diverge_points_big: u32,
    pub drumroll_diverge_points_big: u32,
    pub balloon_diverge_points: u32,
    pub bell_diverge_points: u32,
    pub number_of_diverge_points: u32,
    pub max_score_value: u32,
    pub number_of_measures: u32,
    pub unknown1: u32,
}

impl Default for Header {
    /// All-zero header.
    fn default() -> Self {
        Self {
            judge_timings: vec![JudgeTimingBlock::default(); layout::header::JUDGE_TIMING_BLOCKS],
            has_divergent_paths: 0,
            max_hp: 0,
            clear_hp: 0,
            hp_per_good: 0,
            hp_per_ok: 0,
            hp_per_bad: 0,
            max_combo: 0,
            hp_increase_ratio: 0,
            hp_increase_ratio_master: 0,
            good_diverge_points: 0,
            ok_diverge_points: 0,
            bad_diverge_points: 0,
            drumroll_diverge_points: 0,
            good_diverge_points_big: 0,
            ok_diverge_points_big: 0,
            drumroll_diverge_points_big: 0,
            balloon_diverge_points: 0,
            bell_diverge_points: 0,
            number_of_diverge_points: 0,
            max_score_value: 0,
            number_of_measures: 0,
            unknown1: 0,
        }
    }
}

impl Header {
    /// Diverge points written to every file, in on-disk order.
    pub const STOCK_DIVERGE_POINTS: [u32; layout::header::DIVERGE_POINT_FIELDS] = [
        constants::GOOD_DIVERGE_POINTS,
        constants::OK_DIVERGE_POINTS,
        constants::BAD_DIVERGE_POINTS,
        constants::DRUMROLL_DIVERGE_POINTS,
        constants::GOOD_DIVERGE_POINTS_BIG,
        constants::OK_DIVERGE_POINTS_BIG,
        constants::DRUMROLL_DIVERGE_POINTS_BIG,
        constants::BALLOON_DIVERGE_POINTS,
        constants::BELL_DIVERGE_POINTS,
        constants::NUMBER_OF_DIVERGE_POINTS,
    ];

    /// Header of an unbranched chart with the stock values for `difficulty`.
    pub fn for_difficulty(difficulty: FumenDifficulty) -> Self {
        let mut header = Self {
            has_divergent_paths: 0,
            max_hp: constants::MAX_HP,
            clear_hp: difficulty.clear_hp(),
            hp_per_good: constants::HP_PER_GOOD,
            hp_per_ok: constants::HP_PER_OK,
            hp_per_bad: constants::HP_PER_BAD,
            max_combo: constants::RATIO_ONE,
            hp_increase_ratio: constants::RATIO_ONE,
            hp_increase_ratio_master: constants::RATIO_ONE,
            ..Default::default()
        };
        header.set_diverge_points(Self::STOCK_DIVERGE_POINTS);
        header.reset_judge_timing(difficulty);
        header
    }

    /// Overwrite all 36 judge blocks with the stock windows for `difficulty`.
    pub fn reset_judge_timing(&mut self, difficulty: FumenDifficulty) {
        self.judge_timings = vec![difficulty.judge_timing(); layout::header::JUDGE_TIMING_BLOCKS];
    }

    /// Diverge point fields in on-disk order.
    pub fn diverge_points(&self) -> [u32; layout::header::DIVERGE_POINT_FIELDS] {
        [
            self.good_diverge_points,
            self.ok_diverge_points,
            self.bad_diverge_points,
            self.drumroll_diverge_points,
            self.good_diverge_points_big,
            self.ok_diverge_points_big,
            self.drumroll_diverge_points_big,
            self.balloon_diverge_points,
            self.bell_diverge_points,
            self.number_of_diverge_points,
        ]
    }

    pub(crate) fn set_diverge_points(&mut self, points: [u32; layout::header::DIVERGE_POINT_FIELDS]) {
        let [good, ok, bad, drumroll, good_big, ok_big, drumroll_big, balloon, bell, count] = points;
        self.good_diverge_points = good;
        self.ok_diverge_points = ok;
        self.bad_diverge_points = bad;
        self.drumroll_diverge_points = drumroll;
        self.good_diverge_points_big = good_big;
        self.ok_diverge_points_big = ok_big;
        self.drumroll_diverge_points_big = drumroll_big;
        self.balloon_diverge_points = balloon;
        self.bell_diverge_points = bell;
        self.number_of_diverge_points = count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasureData {
    pub bpm: f32,
    /// Offset in ms: `240000/bpm1 + (240000/bpm1)(x/y) - 240000/bpm2`.
    pub offset: f32,
    pub is_gogo_time: bool,
    pub is_bar_line_visible: bool,
    /// Normal to expert, normal to master, expert to master, expert keep,
    /// master to expert, master keep.
    pub diverge_requirements: [u32; layout::measure::DIVERGE_REQUIREMENT_FIELDS],
}

impl Default for MeasureData {
    fn default() -> Self {
        Self {
            bpm: crate::timing::FALLBACK_TEMPO.bpm,
            offset: 0.0,
            is_gogo_time: false,
            is_bar_line_visible: true,
            diverge_requirements: [constants::NO_DIVERGENCE; layout::measure::DIVERGE_REQUIREMENT_FIELDS],
        }
    }
}

/// Note type codes stored in note records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, IntoStaticStr,
)]
#[repr(u32)]
pub enum FumenNoteType {
    None = 0,
    Don = 1,
    Do = 2,
    Ko = 3,
    Katsu = 4,
    Ka = 5,
    Renda = 6,
    BigDon = 7,
    BigKatsu = 8,
    BigRenda = 9,
    Balloon = 10,
    Bell = 12,
}

impl FumenNoteType {
    pub fn is_renda(self) -> bool {
        matches!(self, Self::Renda | Self::BigRenda)
    }

    pub fn is_balloon(self) -> bool {
        matches!(self, Self::Balloon | Self::Bell)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    /// Raw type code, kept as read so unknown codes survive a rewrite.
    pub note_type: u32,
    /// Milliseconds from the measure start.
    pub offset: f32,
    /// Hit count for balloons.
    pub initial_score: u16,
    pub score_diff_x4: u16,
    pub balloon_hit_count_old: u32,
    /// Milliseconds, rolls and balloons only.
    pub length: f32,
}

impl NoteData {
    pub fn new(note_type: FumenNoteType, offset: f32) -> Self {
        Self {
            note_type: note_type as u32,
            offset,
            ..Default::default()
        }
    }

    pub fn kind(&self) -> Option<FumenNoteType> {
        FumenNoteType::from_repr(self.note_type)
    }

    /// Renda records carry trailing padding.
    pub fn is_renda(&self) -> bool {
        self.kind().is_some_and(FumenNoteType::is_renda)
    }
}

/// Notes of one branch path within a measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNotes {
    pub scroll_speed: f32,
    pub notes: Vec<NoteData>,
}

impl Default for BranchNotes {
    fn default() -> Self {
        Self {
            scroll_speed: 1.0,
            notes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub data: MeasureData,
    /// Indexed by [`BranchType::index`].
    pub branches: [BranchNotes; 3],
}

impl Measure {
    pub fn branch(&self, branch: BranchType) -> &BranchNotes {
        &self.branches[branch.index()]
    }

    pub fn branch_mut(&mut self, branch: BranchType) -> &mut BranchNotes {
        &mut self.branches[branch.index()]
    }

    pub fn normal(&self) -> &BranchNotes {
        self.branch(BranchType::Normal)
    }

    pub fn note_count(&self) -> usize {
        self.branches.iter().map(|b| b.notes.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FumenChart {
    pub header: Header,
    pub measures: Vec<Measure>,
}

impl FumenChart {
    /// Infer the difficulty from the clear HP threshold.
    ///
    /// Normal and Hard share a threshold and are told apart by the first
    /// judge window. Oni and Ura cannot be told apart and are reported as
    /// Oni, as are unrecognised values.
    pub fn difficulty(&self) -> FumenDifficulty {
        match self.header.clear_hp {
            constants::CLEAR_HP_EASY => FumenDifficulty::Easy,
            constants::CLEAR_HP_NORMAL_HARD => {
                let hard = FumenDifficulty::Hard.judge_timing();
                match self.header.judge_timings.first() {
                    Some(block) if approx_eq_f32(block.good, hard.good, epsilon::F32) => {
                        FumenDifficulty::Hard
                    }
                    _ => FumenDifficulty::Normal,
                }
            }
            _ => FumenDifficulty::Oni,
        }
    }

    pub fn has_divergent_paths(&self) -> bool {
        self.header.has_divergent_paths != 0
    }

    pub fn measure_count(&self) -> usize {
        self.measures.len()
    }

    pub fn note_count(&self) -> usize {
        self.measures.iter().map(Measure::note_count).sum()
    }
}

/// True for paths with a `.fumen` or `.bin` extension.
pub fn is_fumen_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("fumen") || ext.eq_ignore_ascii_case("bin"))
}
