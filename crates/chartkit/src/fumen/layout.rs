//! Record layout constants for Fumen V2 charts
//!
//! All records are tightly packed and little-endian. A file is one header
//! followed by `NumberOfMeasures` measures:
//!
//! ```text
//! Header
//! Measure 0: MeasureData, BranchHeader+Notes (normal), (expert), (master)
//! Measure 1: ...
//! ```

/// Layout of the file header
///
/// # Structure Layout
///
/// ```text
/// Offset   Field                     Size    Description
/// ──────────────────────────────────────────────────────────────
/// 0x000    JudgeTimings[36]          432     (good, ok, bad) f32 triples
/// 0x1B0    HasDivergentPaths         4       1 if branched
/// 0x1B4    MaxHP                     4       Usually 10000
/// 0x1B8    ClearHP                   4       6000 / 7000 / 8000
/// 0x1BC    HPPerGood                 4       i32
/// 0x1C0    HPPerOk                   4       i32
/// 0x1C4    HPPerBad                  4       i32, negative
/// 0x1C8    MaxCombo                  4       Fixed point ratio
/// 0x1CC    HPIncreaseRatio           4       Fixed point ratio
/// 0x1D0    HPIncreaseRatioMaster     4       Fixed point ratio
/// 0x1D4    DivergePoints[10]         40      Good/Ok/Bad/Drumroll/GoodBig/
///                                            OkBig/DrumrollBig/Balloon/Bell/Count
/// 0x1FC    MaxScoreValue             4       Deprecated
/// 0x200    NumberOfMeasures          4
/// 0x204    Unknown                   4
/// ```
pub mod header {
    pub const JUDGE_TIMING_BLOCKS: usize = 36;
    pub const JUDGE_TIMING_BLOCK_SIZE: usize = 12;
    pub const JUDGE_TIMINGS_SIZE: usize = JUDGE_TIMING_BLOCKS * JUDGE_TIMING_BLOCK_SIZE;

    pub const HAS_DIVERGENT_PATHS: usize = JUDGE_TIMINGS_SIZE;
    pub const DIVERGE_POINTS: usize = 0x1D4;
    pub const DIVERGE_POINT_FIELDS: usize = 10;
    pub const NUMBER_OF_MEASURES: usize = 0x200;

    pub const SIZE: usize = 0x208;
}

/// Layout of the per-measure record
///
/// ```text
/// Offset   Field                     Size    Description
/// ──────────────────────────────────────────────────────────────
/// 0x00     BPM                       4       f32
/// 0x04     MeasureOffset             4       f32, ms
/// 0x08     IsGogoTime                1
/// 0x09     IsBarLineVisible          1
/// 0x0A     (padding)                 2
/// 0x0C     DivergeRequirements[6]    24      0xFFFFFFFF when unbranched
/// 0x24     (padding)                 4
/// ```
pub mod measure {
    pub const BPM: usize = 0x00;
    pub const OFFSET: usize = 0x04;
    pub const IS_GOGO_TIME: usize = 0x08;
    pub const IS_BAR_LINE_VISIBLE: usize = 0x09;
    pub const DIVERGE_REQUIREMENTS: usize = 0x0C;
    pub const DIVERGE_REQUIREMENT_FIELDS: usize = 6;

    pub const SIZE: usize = 0x28;
}

/// Layout of the header preceding each branch's notes
///
/// ```text
/// Offset   Field                     Size
/// ──────────────────────────────────────
/// 0x00     NumberOfNotes             2
/// 0x02     (padding)                 2
/// 0x04     ScrollSpeed               4
/// ```
pub mod branch {
    pub const NOTE_COUNT: usize = 0x00;
    pub const SCROLL_SPEED: usize = 0x04;

    pub const SIZE: usize = 0x08;
    pub const PER_MEASURE: usize = 3;
}

/// Layout of one note record
///
/// ```text
/// Offset   Field                     Size    Description
/// ──────────────────────────────────────────────────────────────
/// 0x00     Type                      4       Note type code
/// 0x04     NoteOffset                4       f32, ms within the measure
/// 0x08     (padding)                 4
/// 0x0C     InitialScoreValue         2       Hit count for balloons
/// 0x0E     ScoreDifferenceTimes4     2
/// 0x10     BalloonHitCount_Old       4       Legacy hit count
/// 0x14     Length                    4       f32, ms for rolls and balloons
/// ```
///
/// Renda and big renda records are followed by [`RENDA_PADDING`](note::RENDA_PADDING)
/// extra bytes.
pub mod note {
    pub const TYPE: usize = 0x00;
    pub const OFFSET: usize = 0x04;
    pub const INITIAL_SCORE: usize = 0x0C;
    pub const SCORE_DIFF_X4: usize = 0x0E;
    pub const BALLOON_HIT_COUNT_OLD: usize = 0x10;
    pub const LENGTH: usize = 0x14;

    pub const SIZE: usize = 0x18;
    pub const RENDA_PADDING: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(header::SIZE, 520);
        assert_eq!(header::JUDGE_TIMINGS_SIZE, 432);
        assert_eq!(header::DIVERGE_POINTS, header::HAS_DIVERGENT_PATHS + 4 * 9);
        assert_eq!(header::NUMBER_OF_MEASURES, header::DIVERGE_POINTS + 4 * 11);
        assert_eq!(measure::SIZE, 40);
        assert_eq!(
            measure::DIVERGE_REQUIREMENTS + 4 * measure::DIVERGE_REQUIREMENT_FIELDS + 4,
            measure::SIZE
        );
        assert_eq!(branch::SIZE, 8);
        assert_eq!(note::SIZE, 24);
        assert_eq!(note::LENGTH + 4, note::SIZE);
    }
}
