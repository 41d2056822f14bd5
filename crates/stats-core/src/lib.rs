//! Shared building blocks for article statistics: the data model, the error
//! type, naive date utilities, display formatting and CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, StatsError};
