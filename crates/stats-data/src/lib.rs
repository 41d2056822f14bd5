//! Parsing and aggregation engine for article exports.
//!
//! Turns the semicolon-delimited article export and the taxonomy export into
//! flat statistics, taxonomy rollups and per-value timelines. Every function
//! here is pure over in-memory text and data apart from [`reader::load_text`].

pub mod aggregator;
pub mod analysis;
pub mod hierarchy;
pub mod reader;
pub mod taxonomy;
pub mod timeline;

pub use stats_core as core;
