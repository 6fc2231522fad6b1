//! Requirements manifest handling.
//!
//! Loading and parsing are separate steps so that a missing file is reported
//! before any parsing starts, and parsing can be exercised on in-memory lines.

pub mod load;
pub mod parse;

pub use load::{load_manifest, Manifest};
pub use parse::{logical_lines, parse_lines, parse_manifest, LogicalLine};
