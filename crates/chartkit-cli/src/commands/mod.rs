//! CLI command implementations.

pub mod compare;
pub mod convert;
pub mod inspect;
pub mod roundtrip;
