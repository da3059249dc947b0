//! Data layer for the listening recap.
//!
//! Discovers streaming-history export files, loads them into typed records,
//! projects them onto the playback schema and computes grouped summaries.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use recap_core as core;
