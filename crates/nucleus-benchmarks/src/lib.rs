//! nucleus benchmarking suite
//!
//! Benchmarks for manifest parsing, marker evaluation and metadata rendering.

pub mod common;

pub use common::*;
