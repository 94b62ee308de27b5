#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]
#![allow(clippy::needless_doctest_main)]
#![doc = include_str!("../README.md")]

///
/// Core: event data and IO traits
///
pub mod core;

///
/// Discovery of frequent patterns from event data
///
pub mod discovery;

/// Util module with smaller helper functions
#[cfg(test)]
pub mod utils;

#[doc(inline)]
pub use crate::core::event_data::{EventStream, FlatEvent};

#[doc(inline)]
pub use crate::core::io::Importable;

#[doc(inline)]
pub use crate::core::event_data::process_executions::derive_process_executions;

#[doc(inline)]
pub use crate::discovery::serial_episodes::{
    discover_serial_episodes, per_trace::discover_serial_episodes_per_trace, EpisodeMiningError,
    EpisodeMiningOptions, EpisodeRecord, EpisodeStep, PatternId,
};
