//! Converters between the chart model and the Fumen and TJA formats.
//!
//! - `fumen_to_chart` / `chart_to_fumen` - binary Fumen charts
//! - `tja_to_chart` / `chart_to_tja` - pre-parsed TJA measures

mod chart_to_fumen;
mod chart_to_tja;
mod common;
mod fumen_to_chart;
mod tja_to_chart;

pub use chart_to_fumen::*;
pub use chart_to_tja::*;
pub use common::{note_type_from_fumen, note_type_from_tja, note_type_to_fumen, note_type_to_tja};
pub use fumen_to_chart::*;
pub use tja_to_chart::*;
