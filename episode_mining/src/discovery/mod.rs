//! Pattern Discovery
//!
//! Discovery algorithms learn frequent behavioral patterns from input event data.
pub mod serial_episodes;
