//! # flysbe bench
//!
//! Benchmarking utilities for flysbe performance testing.

pub mod fixtures;
pub mod latency;
