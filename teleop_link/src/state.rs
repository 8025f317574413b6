//! State machine module root.

pub mod arm;
