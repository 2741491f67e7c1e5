//! Pre-parsed TJA measure model.
//!
//! Text parsing and emission live outside this crate; converters exchange
//! charts with it through [`TjaDocument`].

mod types;

pub use types::*;
