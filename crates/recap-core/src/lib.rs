//! Shared types for the listening recap: playback records, errors, timestamp
//! parsing, number formatting and command-line settings.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{RecapError, Result};
