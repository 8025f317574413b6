//! Command processing root.
//!
//! Controller decoding and per-cycle transmission scheduling.

pub mod input;
pub mod scheduler;
