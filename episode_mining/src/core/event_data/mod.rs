//! Event Data
//!
//! The flat event stream consumed by the pattern miners, plus adjacent utilities
pub mod flat_event;
/// IO implementations for [`EventStream`]
pub mod io;
pub mod process_executions;
pub mod timestamp_utils;

#[doc(inline)]
pub use flat_event::{EventStream, FlatEvent};
