//! Teleop Common Library
//!
//! Shared constants, protocol value types and configuration loading for
//! the teleop link workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Wire constants and reference defaults
//! - [`config`] - Configuration loading traits and types
//! - [`link`] - Protocol types, link configuration and errors
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use teleop_common::consts::*;
//! use teleop_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod config;
pub mod consts;
pub mod link;
pub mod prelude;
