//! Core modules: event data structs and IO

pub use chrono;
pub mod event_data;

/// IO Traits
pub mod io;

pub use event_data::{EventStream, FlatEvent};
