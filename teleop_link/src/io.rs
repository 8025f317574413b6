//! Input sources and output sinks.

pub mod sink;
pub mod source;
