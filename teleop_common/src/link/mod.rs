//! Operator link shared types.
//!
//! Protocol value types, shaping profiles, the link configuration model
//! and the error types shared between the link runtime and its tools.

pub mod config;
pub mod error;
pub mod profile;
pub mod types;
