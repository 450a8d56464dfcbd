//! Output module for reporting on stored profiles
//!
//! This module handles loading and printing statistics for the
//! `--stats` view.

pub mod stats;

pub use stats::{load_statistics, print_statistics, SweepStatistics, DEFAULT_RECENT_LIMIT};
