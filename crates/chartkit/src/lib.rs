pub mod chart;
pub mod compare;
pub mod config;
pub mod convert;
pub mod error;
pub mod fumen;
pub mod timing;
pub mod tja;

pub use chart::{ChartCourse, ChartProject, Note, NoteType};
pub use compare::{DiffSink, collect_differences, compare_charts};
pub use config::ConvertConfig;
pub use convert::{chart_to_fumen, chart_to_tja, fumen_to_chart, tja_to_chart};
pub use error::{Error, Result};
pub use fumen::{FumenChart, read_fumen_bytes, read_fumen_file, write_fumen_bytes, write_fumen_file};
pub use timing::{Beat, Tempo, TempoMap, Time, TimeSignature};
pub use tja::TjaDocument;
