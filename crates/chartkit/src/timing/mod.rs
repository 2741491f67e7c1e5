//! Beat and time handling.
//!
//! - `Beat`, `Time`, `Tempo`, `TimeSignature` - units
//! - `SortedList` - beat-ordered event storage
//! - `TempoMap` - tempo/signature schedule with Beat <-> Time conversion
//! - `BeatBars` - bar and beat boundaries walked from a `TempoMap`

mod bar_walker;
mod beat;
mod sorted_list;
mod tempo_map;

pub use bar_walker::*;
pub use beat::*;
pub use sorted_list::*;
pub use tempo_map::*;
