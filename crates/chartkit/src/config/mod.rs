//! Conversion settings and fixed format constants.
//!
//! `ConvertConfig` holds the tunables a caller may override (typically from a
//! TOML file loaded by the CLI). The sub-modules hold constants that are part
//! of the formats themselves and are never configured.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerances used for floating point comparisons.
pub mod epsilon {
    /// BPM and scroll speed comparisons.
    pub const BPM: f32 = 0.0001;

    /// Generic f32 comparisons (scroll vectors, volumes).
    pub const F32: f32 = 0.0001;

    /// Time comparisons in seconds.
    pub const TIME_SEC: f64 = 0.000_001;

    /// Remainder, in milliseconds, below which an inferred bar length is
    /// treated as an exact fit.
    pub const DENOMINATOR_MATCH_MS: f64 = 0.01;
}

/// Constants of the Fumen V2 format that are not part of the record layout.
pub mod fumen {
    /// Measure count limit documented for the format (200 on older platforms).
    pub const MAX_MEASURES: u32 = 300;

    /// Largest denominator tried when reconstructing time signatures.
    pub const MAX_INFERRED_DENOMINATOR: u32 = 1023;

    /// Sentinel written to every divergence requirement field.
    pub const NO_DIVERGENCE: u32 = 0xFFFF_FFFF;

    pub const MAX_HP: u32 = 10000;
    pub const CLEAR_HP_EASY: u32 = 6000;
    pub const CLEAR_HP_NORMAL_HARD: u32 = 7000;
    pub const CLEAR_HP_ONI: u32 = 8000;

    pub const HP_PER_GOOD: i32 = 10;
    pub const HP_PER_OK: i32 = 5;
    pub const HP_PER_BAD: i32 = -20;

    /// Fixed-point 1.0 used by the combo and HP ratio fields.
    pub const RATIO_ONE: u32 = 65536;

    pub const GOOD_DIVERGE_POINTS: u32 = 20;
    pub const OK_DIVERGE_POINTS: u32 = 10;
    pub const BAD_DIVERGE_POINTS: u32 = 0;
    pub const DRUMROLL_DIVERGE_POINTS: u32 = 1;
    pub const GOOD_DIVERGE_POINTS_BIG: u32 = 20;
    pub const OK_DIVERGE_POINTS_BIG: u32 = 10;
    pub const DRUMROLL_DIVERGE_POINTS_BIG: u32 = 1;
    pub const BALLOON_DIVERGE_POINTS: u32 = 30;
    pub const BELL_DIVERGE_POINTS: u32 = 30;
    pub const NUMBER_OF_DIVERGE_POINTS: u32 = 20;

    /// Judge windows (good, ok, bad) in milliseconds for Easy and Normal.
    pub const JUDGE_TIMING_EASY_NORMAL: (f32, f32, f32) = (41.708_336, 108.441_666, 125.125);

    /// Judge windows (good, ok, bad) in milliseconds for Hard, Oni and Ura.
    pub const JUDGE_TIMING_HARD_ONI: (f32, f32, f32) = (25.025_002, 75.075_005, 108.441_666);
}

/// Settings for the chart converters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Tempo used when a chart carries no tempo information at all.
    pub fallback_bpm: f32,
    /// Tolerance for BPM and scroll speed comparisons.
    pub bpm_epsilon: f32,
    /// Remainder (ms) accepted as an exact bar fit during denominator inference.
    pub denominator_match_ms: f64,
    /// Upper bound of the denominator search.
    pub max_denominator: u32,
    /// Course written by the chart to Fumen converter.
    pub target_course: usize,
    /// Stamp converted TJA documents with a generator comment.
    pub tja_generator_comment: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            fallback_bpm: crate::timing::FALLBACK_TEMPO.bpm,
            bpm_epsilon: epsilon::BPM,
            denominator_match_ms: epsilon::DENOMINATOR_MATCH_MS,
            max_denominator: fumen::MAX_INFERRED_DENOMINATOR,
            target_course: 0,
            tja_generator_comment: false,
        }
    }
}

impl ConvertConfig {
    /// Reject settings that would make the converters misbehave.
    pub fn validate(&self) -> Result<()> {
        if !(self.fallback_bpm.is_finite() && self.fallback_bpm > 0.0) {
            return Err(Error::Config(format!(
                "fallback_bpm must be positive, got {}",
                self.fallback_bpm
            )));
        }
        if self.max_denominator == 0 {
            return Err(Error::Config("max_denominator must be at least 1".to_string()));
        }
        if self.bpm_epsilon < 0.0 || self.denominator_match_ms < 0.0 {
            return Err(Error::Config("tolerances must not be negative".to_string()));
        }
        Ok(())
    }
}
