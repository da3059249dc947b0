//! Runtime helpers for the listening recap.
//!
//! [`data_manager::DataManager`] memoizes loaded playback events so repeated
//! summaries over the same files and date range skip the load.

pub mod data_manager;
