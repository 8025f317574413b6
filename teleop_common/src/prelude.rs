//! Prelude module for common re-exports.
//!
//! ```rust
//! use teleop_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::link::config::LinkConfig;

// ─── Protocol ───────────────────────────────────────────────────────
pub use crate::consts::{START_BYTE, ZERO_COMMAND};
pub use crate::link::error::{InputError, LinkError};
pub use crate::link::types::{
    ArmMode, AutoHeight, GainMode, GainSet, InputSample, MotorCommand, ReservedBand,
    ReservedSignal,
};
