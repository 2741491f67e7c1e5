//! Canonical in-memory chart model.
//!
//! A `ChartProject` owns one or more `ChartCourse`s. Every course carries its
//! own `TempoMap` plus beat-sorted event lists; converters produce and consume
//! this model.

mod course;
mod events;

pub use course::*;
pub use events::*;

pub use crate::timing::{TempoChange, TimeSignatureChange};
