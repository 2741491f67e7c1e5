//! Musical and playback time units.

use std::fmt;
use std::ops;

use gcd::Gcd;
use serde::{Deserialize, Serialize};

use crate::config::epsilon;

/// Discrete musical position measured in ticks of a quarter note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Beat {
    pub ticks: i32,
}

impl Beat {
    pub const TICKS_PER_BEAT: i32 = 48;
    pub const TICKS_PER_BAR: i32 = Self::TICKS_PER_BEAT * 4;
    pub const ZERO: Beat = Beat { ticks: 0 };

    pub const fn from_ticks(ticks: i32) -> Self {
        Self { ticks }
    }

    /// Whole 4/4 bars.
    pub const fn from_bars(bars: i32) -> Self {
        Self {
            ticks: bars * Self::TICKS_PER_BAR,
        }
    }

    /// Whole quarter notes.
    pub const fn from_beats(beats: i32) -> Self {
        Self {
            ticks: beats * Self::TICKS_PER_BEAT,
        }
    }

    /// Nearest tick to a fractional quarter-note count.
    pub fn from_beats_f64(beats: f64) -> Self {
        Self {
            ticks: (beats * Self::TICKS_PER_BEAT as f64).round() as i32,
        }
    }

    pub fn as_beats_f64(self) -> f64 {
        self.ticks as f64 / Self::TICKS_PER_BEAT as f64
    }

    pub fn max(self, other: Self) -> Self {
        Ord::max(self, other)
    }
}

impl ops::Add for Beat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_ticks(self.ticks + rhs.ticks)
    }
}

impl ops::AddAssign for Beat {
    fn add_assign(&mut self, rhs: Self) {
        self.ticks += rhs.ticks;
    }
}

impl ops::Sub for Beat {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_ticks(self.ticks - rhs.ticks)
    }
}

impl ops::SubAssign for Beat {
    fn sub_assign(&mut self, rhs: Self) {
        self.ticks -= rhs.ticks;
    }
}

impl ops::Neg for Beat {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_ticks(-self.ticks)
    }
}

impl ops::Mul<i32> for Beat {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::from_ticks(self.ticks * rhs)
    }
}

impl ops::Div<i32> for Beat {
    type Output = Self;

    fn div(self, rhs: i32) -> Self {
        Self::from_ticks(self.ticks / rhs)
    }
}

impl fmt::Display for Beat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.ticks)
    }
}

/// Continuous playback position in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Time {
    pub seconds: f64,
}

impl Time {
    pub const ZERO: Time = Time { seconds: 0.0 };

    pub const fn from_sec(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn from_ms(ms: f64) -> Self {
        Self {
            seconds: ms / 1000.0,
        }
    }

    pub fn to_ms(self) -> f64 {
        self.seconds * 1000.0
    }

    pub fn to_ms_f32(self) -> f32 {
        self.to_ms() as f32
    }

    pub fn approx_eq(self, other: Self) -> bool {
        (self.seconds - other.seconds).abs() <= epsilon::TIME_SEC
    }

    pub fn max(self, other: Self) -> Self {
        if other.seconds > self.seconds { other } else { self }
    }
}

impl ops::Add for Time {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_sec(self.seconds + rhs.seconds)
    }
}

impl ops::Sub for Time {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_sec(self.seconds - rhs.seconds)
    }
}

impl ops::AddAssign for Time {
    fn add_assign(&mut self, rhs: Self) {
        self.seconds += rhs.seconds;
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}ms", self.to_ms())
    }
}

/// Beats per minute, quarter note based.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Tempo {
    pub bpm: f32,
}

/// Tempo assumed when a chart carries none.
pub const FALLBACK_TEMPO: Tempo = Tempo { bpm: 160.0 };

impl Tempo {
    pub const fn new(bpm: f32) -> Self {
        Self { bpm }
    }

    /// Milliseconds for one 4/4 bar at this tempo.
    pub fn bar_ms(self) -> f64 {
        240000.0 / self.bpm as f64
    }

    pub fn approx_eq(self, other: Self) -> bool {
        approx_eq_f32(self.bpm, other.bpm, epsilon::BPM)
    }
}

impl Default for Tempo {
    fn default() -> Self {
        FALLBACK_TEMPO
    }
}

pub fn approx_eq_f32(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}

/// Bar layout: `numerator` beats of one `denominator`th of a whole note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: i32,
    pub denominator: i32,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
    };

    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn is_valid(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Reduce by the greatest common divisor, e.g. 4/16 to 1/4.
    pub fn simplify(&mut self) {
        if !self.is_valid() {
            return;
        }
        let gcd = (self.numerator as u32).gcd(self.denominator as u32) as i32;
        self.numerator /= gcd;
        self.denominator /= gcd;
    }

    pub fn simplified(mut self) -> Self {
        self.simplify();
        self
    }

    pub fn duration_per_beat(self) -> Beat {
        if self.denominator <= 0 {
            return Beat::ZERO;
        }
        Beat::from_bars(1) / self.denominator
    }

    pub fn duration_per_bar(self) -> Beat {
        self.duration_per_beat() * self.numerator.max(0)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Two dimensional scroll speed; the real part is the regular speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f32,
    pub im: f32,
}

impl Complex {
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    pub const fn real(re: f32) -> Self {
        Self { re, im: 0.0 }
    }

    pub fn approx_eq(self, other: Self) -> bool {
        approx_eq_f32(self.re, other.re, epsilon::F32) && approx_eq_f32(self.im, other.im, epsilon::F32)
    }
}

impl Default for Complex {
    fn default() -> Self {
        Self::real(1.0)
    }
}
