//! Schedtally - deduplicate a tab-delimited course schedule and tally
//! unique sections per subject
//!
//! This library provides the single-pass aggregator, the record view it
//! parses lines into, the duplicates side log, and summary renderers for
//! text, JSON and CSV output.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod duplicates;
pub mod error;
pub mod filter;
pub mod json_output;
pub mod record;
pub mod stats;
