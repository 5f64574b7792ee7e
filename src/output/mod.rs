//! Result reporting
//!
//! `text` reproduces the classic two-block report (configuration summary on
//! stderr, result on stdout); `json` writes a machine-readable copy.

pub mod json;
pub mod text;
